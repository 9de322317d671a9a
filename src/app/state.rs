//! The single UI state record of the page controller.
//!
//! Views only read from [`PageState`]. Every mutation goes through one of the
//! named handlers below, called by the controller in response to input events
//! or task updates.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::api::{DepthResult, GpuStatus, PredictRequest};
use crate::app::preferences::Preferences;
use crate::common::{Colormap, SelectedImage};
use crate::error::ApiError;
use crate::i18n::{Locale, TextKey};

/// How long the progress bar stays filled after a request completes.
pub const PROGRESS_RESET_DELAY: Duration = Duration::from_secs(2);

const FILL_UPLOADING: f32 = 0.2;
const FILL_INFERRING: f32 = 0.5;
const FILL_FINISHED: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocalMode {
    #[default]
    Auto,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    SideBySide,
    Slider,
    DepthOnly,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Progress {
    #[default]
    Idle,
    Uploading,
    Inferring,
    Done,
    Failed(String),
}

/// What the status poll last reported, ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct GpuPanel {
    pub online: bool,
    pub name: String,
    pub stat_label: String,
    pub memory_fraction: f32,
    pub memory_label: String,
    pub model_loaded: bool,
}

impl Default for GpuPanel {
    fn default() -> Self {
        Self {
            online: false,
            name: "-".to_string(),
            stat_label: "-".to_string(),
            memory_fraction: 0.0,
            memory_label: String::new(),
            model_loaded: false,
        }
    }
}

impl From<&GpuStatus> for GpuPanel {
    fn from(status: &GpuStatus) -> Self {
        match status.device() {
            Some(gpu) => Self {
                online: true,
                name: gpu.name.clone().unwrap_or_default(),
                stat_label: gpu.short_name(),
                memory_fraction: gpu.memory_fraction(),
                memory_label: gpu.memory_label(),
                model_loaded: status.model_loaded,
            },
            None => Self {
                online: false,
                name: "No GPU".to_string(),
                stat_label: "CPU".to_string(),
                memory_fraction: 0.0,
                memory_label: String::new(),
                model_loaded: status.model_loaded,
            },
        }
    }
}

#[derive(Debug)]
pub struct PageState {
    locale: Locale,
    colormap: Colormap,
    focal_mode: FocalMode,
    focal_input: String,
    view_mode: ViewMode,
    slider_split: f32,
    selected: Option<SelectedImage>,
    preview_revision: u64,
    busy: bool,
    in_flight: Option<SelectedImage>,
    progress: Progress,
    progress_fill: f32,
    progress_tinted: bool,
    progress_reset_at: Option<Instant>,
    result: Option<DepthResult>,
    result_source: Option<SelectedImage>,
    result_revision: u64,
    inference_time: Option<Duration>,
    gpu: GpuPanel,
    notice: Option<String>,
}

impl PageState {
    pub fn new(preferences: Preferences) -> Self {
        Self {
            locale: preferences.locale,
            colormap: preferences.colormap,
            focal_mode: FocalMode::default(),
            focal_input: String::new(),
            view_mode: ViewMode::default(),
            slider_split: 0.5,
            selected: None,
            preview_revision: 0,
            busy: false,
            in_flight: None,
            progress: Progress::Idle,
            progress_fill: 0.0,
            progress_tinted: false,
            progress_reset_at: None,
            result: None,
            result_source: None,
            result_revision: 0,
            inference_time: None,
            gpu: GpuPanel::default(),
            notice: None,
        }
    }

    pub fn text(&self, key: TextKey) -> &'static str {
        self.locale.text(key)
    }

    pub fn preferences(&self) -> Preferences {
        Preferences {
            locale: self.locale,
            colormap: self.colormap,
        }
    }

    // Handlers

    /// Buffers `file` as the selection. Non-image files are ignored and leave
    /// the state untouched. Returns whether the file was accepted.
    pub fn select_file(&mut self, file: SelectedImage) -> bool {
        if !file.is_image() {
            debug!("Ignoring {} ({})", file.name(), file.media_type());
            return false;
        }
        debug!("Selected {}", file.info_label());
        self.selected = Some(file);
        self.preview_revision += 1;
        true
    }

    pub fn clear_image(&mut self) {
        self.selected = None;
        self.preview_revision += 1;
    }

    pub fn set_locale(&mut self, locale: Locale) {
        self.locale = locale;
    }

    pub fn set_colormap(&mut self, colormap: Colormap) {
        self.colormap = colormap;
    }

    pub fn set_focal_mode(&mut self, focal_mode: FocalMode) {
        self.focal_mode = focal_mode;
    }

    pub fn set_focal_input(&mut self, input: impl Into<String>) {
        self.focal_input = input.into();
    }

    pub fn set_view_mode(&mut self, view_mode: ViewMode) {
        self.view_mode = view_mode;
    }

    pub fn set_slider_split(&mut self, split: f32) {
        self.slider_split = split.clamp(0.0, 1.0);
    }

    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    /// Marks a request as in flight and returns what to send, or `None` when
    /// nothing is selected or a request is already running.
    pub fn begin_submit(&mut self) -> Option<PredictRequest> {
        if !self.can_submit() {
            return None;
        }
        let image = self.selected.clone()?;

        self.busy = true;
        self.in_flight = Some(image.clone());
        self.progress = Progress::Uploading;
        self.progress_fill = FILL_UPLOADING;
        self.progress_tinted = false;
        self.progress_reset_at = None;

        Some(PredictRequest {
            image,
            colormap: self.colormap,
            focal_length: self.manual_focal_length(),
        })
    }

    pub fn mark_inferring(&mut self) {
        if self.busy {
            self.progress = Progress::Inferring;
            self.progress_fill = FILL_INFERRING;
        }
    }

    pub fn finish_submit(
        &mut self,
        outcome: Result<DepthResult, ApiError>,
        elapsed: Duration,
        now: Instant,
    ) {
        self.busy = false;
        let source = self.in_flight.take();
        self.progress_fill = FILL_FINISHED;
        self.progress_reset_at = Some(now + PROGRESS_RESET_DELAY);

        match outcome {
            Ok(result) => {
                self.result = Some(result);
                self.result_source = source;
                self.result_revision += 1;
                self.inference_time = Some(elapsed);
                self.progress = Progress::Done;
            }
            Err(e) => {
                self.progress = Progress::Failed(e.to_string());
                self.progress_tinted = true;
            }
        }
    }

    pub fn apply_gpu_status(&mut self, status: &GpuStatus) {
        self.gpu = GpuPanel::from(status);
    }

    /// Empties the progress bar once the reset delay has passed. The text stays.
    pub fn tick(&mut self, now: Instant) {
        match self.progress_reset_at {
            Some(reset_at) if now >= reset_at => {
                self.progress_fill = 0.0;
                self.progress_tinted = false;
                self.progress_reset_at = None;
            }
            _ => {}
        }
    }

    // Reads

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn colormap(&self) -> Colormap {
        self.colormap
    }

    pub fn focal_mode(&self) -> FocalMode {
        self.focal_mode
    }

    pub fn focal_input(&self) -> &str {
        &self.focal_input
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn slider_split(&self) -> f32 {
        self.slider_split
    }

    pub fn selected(&self) -> Option<&SelectedImage> {
        self.selected.as_ref()
    }

    pub fn preview_revision(&self) -> u64 {
        self.preview_revision
    }

    pub fn file_info_label(&self) -> String {
        self.selected
            .as_ref()
            .map(SelectedImage::info_label)
            .unwrap_or_default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn can_submit(&self) -> bool {
        self.selected.is_some() && !self.busy
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn progress_fill(&self) -> f32 {
        self.progress_fill
    }

    pub fn progress_tinted(&self) -> bool {
        self.progress_tinted
    }

    /// Progress line in the current locale, e.g. `Failed: CUDA out of memory`.
    pub fn progress_text(&self) -> Option<String> {
        match &self.progress {
            Progress::Idle => None,
            Progress::Uploading => Some(self.text(TextKey::Uploading).to_string()),
            Progress::Inferring => Some(self.text(TextKey::Inferring).to_string()),
            Progress::Done => Some(self.text(TextKey::Done).to_string()),
            Progress::Failed(message) => {
                Some(format!("{}: {}", self.text(TextKey::Error), message))
            }
        }
    }

    pub fn result(&self) -> Option<&DepthResult> {
        self.result.as_ref()
    }

    /// The image that produced the current result, which may differ from the
    /// current selection.
    pub fn result_source(&self) -> Option<&SelectedImage> {
        self.result_source.as_ref()
    }

    pub fn result_revision(&self) -> u64 {
        self.result_revision
    }

    pub fn inference_time_label(&self) -> String {
        self.inference_time
            .map(|elapsed| format!("{:.2}", elapsed.as_secs_f64()))
            .unwrap_or_else(|| "-".to_string())
    }

    pub fn gpu(&self) -> &GpuPanel {
        &self.gpu
    }

    pub fn model_status_label(&self) -> &'static str {
        if self.gpu.model_loaded {
            self.text(TextKey::ModelLoaded)
        } else {
            self.text(TextKey::ModelUnloaded)
        }
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// The manual focal length to send, if the manual toggle is on and the
    /// field holds a positive number.
    fn manual_focal_length(&self) -> Option<String> {
        if self.focal_mode != FocalMode::Manual {
            return None;
        }
        let input = self.focal_input.trim();
        if input.is_empty() {
            return None;
        }
        match input.parse::<f64>() {
            Ok(value) if value.is_finite() && value > 0.0 => Some(input.to_string()),
            _ => {
                warn!("Ignoring invalid focal length '{}'", input);
                None
            }
        }
    }
}
