use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::sync::mpsc::error::TryRecvError;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::api::DepthApi;
use crate::app::controller::UiUpdate;
use crate::app::poller::StatusPoller;
use crate::app::preferences::{PreferenceStore, Preferences};
use crate::app::state::{FocalMode, PageState, ViewMode};
use crate::common::{Colormap, SelectedImage};
use crate::error::AppError;
use crate::i18n::{Locale, TextKey};

const UPDATE_BUFFER_SIZE: usize = 64;

/// Owns the page state and runs every network call as a task on `runtime`.
///
/// Tasks report back through one channel; [`PageController::pump`] applies
/// their updates on the UI thread.
pub struct PageController {
    state: PageState,
    api: Arc<dyn DepthApi>,
    preferences: PreferenceStore,
    runtime: Handle,
    update_tx: Sender<UiUpdate>,
    update_rx: Receiver<UiUpdate>,
    poller: Option<StatusPoller>,
}

impl PageController {
    pub fn new(
        api: Arc<dyn DepthApi>,
        preferences: PreferenceStore,
        defaults: Preferences,
        runtime: Handle,
    ) -> Self {
        let (update_tx, update_rx) = mpsc::channel(UPDATE_BUFFER_SIZE);
        let loaded = preferences.load(defaults);
        info!(
            "Page controller ready: lang={} colormap={}",
            loaded.locale, loaded.colormap
        );

        Self {
            state: PageState::new(loaded),
            api,
            preferences,
            runtime,
            update_tx,
            update_rx,
            poller: None,
        }
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    pub fn start_polling(&mut self, interval: Duration) {
        if let Some(mut poller) = self.poller.take() {
            poller.stop();
        }
        self.poller = Some(StatusPoller::start(
            self.api.clone(),
            interval,
            self.update_tx.clone(),
            &self.runtime,
        ));
    }

    pub fn stop(&mut self) {
        if let Some(mut poller) = self.poller.take() {
            poller.stop();
            info!("Status polling stopped");
        }
    }

    /// Applies all pending task updates and advances time-based state.
    /// Returns the number of updates applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        loop {
            match self.update_rx.try_recv() {
                Ok(update) => {
                    self.apply(update);
                    applied += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    error!("UI update channel disconnected");
                    break;
                }
            }
        }
        self.state.tick(Instant::now());
        applied
    }

    fn apply(&mut self, update: UiUpdate) {
        match update {
            UiUpdate::GpuStatus(status) => self.state.apply_gpu_status(&status),
            UiUpdate::PredictStarted => self.state.mark_inferring(),
            UiUpdate::PredictFinished { outcome, elapsed } => {
                self.state.finish_submit(outcome, elapsed, Instant::now());
            }
            UiUpdate::ArtifactSaved(Ok(path)) => {
                let notice = format!("{}: {}", self.state.text(TextKey::Saved), path.display());
                self.state.set_notice(notice);
            }
            UiUpdate::ArtifactSaved(Err(message)) => {
                let notice = format!("{}: {}", self.state.text(TextKey::Error), message);
                self.state.set_notice(notice);
            }
        }
    }

    // Input handlers

    pub fn select_file(&mut self, file: SelectedImage) -> bool {
        self.state.select_file(file)
    }

    /// Reads `path` and selects it. Unreadable files are logged and ignored.
    pub fn select_path(&mut self, path: &Path) -> bool {
        match SelectedImage::from_path(path) {
            Ok(file) => self.select_file(file),
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                false
            }
        }
    }

    pub fn clear_image(&mut self) {
        self.state.clear_image();
    }

    pub fn change_locale(&mut self, locale: Locale) {
        if self.state.locale() == locale {
            return;
        }
        self.state.set_locale(locale);
        self.persist();
    }

    pub fn set_colormap(&mut self, colormap: Colormap) {
        if self.state.colormap() == colormap {
            return;
        }
        self.state.set_colormap(colormap);
        self.persist();
    }

    pub fn set_focal_mode(&mut self, focal_mode: FocalMode) {
        self.state.set_focal_mode(focal_mode);
    }

    pub fn set_focal_input(&mut self, input: impl Into<String>) {
        self.state.set_focal_input(input);
    }

    pub fn set_view_mode(&mut self, view_mode: ViewMode) {
        self.state.set_view_mode(view_mode);
    }

    pub fn set_slider_split(&mut self, split: f32) {
        self.state.set_slider_split(split);
    }

    fn persist(&self) {
        if let Err(e) = self.preferences.save(&self.state.preferences()) {
            warn!(
                "Failed to save preferences to {}: {}",
                self.preferences.path().display(),
                e
            );
        }
    }

    // Network actions

    /// Sends the selected image for prediction. Returns `None` without doing
    /// anything when there is no selection or a request is already in flight.
    pub fn submit(&mut self) -> Option<JoinHandle<()>> {
        let request = self.state.begin_submit()?;
        let request_id = Uuid::new_v4();
        info!(
            "Submitting {} as request {} (colormap={}, focal_length={:?})",
            request.image.info_label(),
            request_id,
            request.colormap,
            request.focal_length
        );

        let api = self.api.clone();
        let update_tx = self.update_tx.clone();
        Some(self.runtime.spawn(async move {
            let started = Instant::now();
            let _ = update_tx.send(UiUpdate::PredictStarted).await;

            let outcome = api.predict(request).await;
            let elapsed = started.elapsed();
            match &outcome {
                Ok(result) => info!(
                    "Request {} finished in {:.2}s: depth {:.2}..{:.2} m",
                    request_id,
                    elapsed.as_secs_f64(),
                    result.min_depth_m,
                    result.max_depth_m
                ),
                Err(e) => error!("Request {} failed: {}", request_id, e),
            }

            if update_tx
                .send(UiUpdate::PredictFinished { outcome, elapsed })
                .await
                .is_err()
            {
                warn!("Request {} finished after the UI went away", request_id);
            }
        }))
    }

    /// Asks the service to release GPU memory, then refreshes the status once.
    pub fn offload_gpu(&mut self) -> JoinHandle<()> {
        let api = self.api.clone();
        let update_tx = self.update_tx.clone();
        self.runtime.spawn(async move {
            if let Err(e) = api.offload_gpu().await {
                error!("GPU offload failed: {}", e);
            } else {
                info!("GPU offload requested");
            }

            match api.gpu_status().await {
                Ok(status) => {
                    let _ = update_tx.send(UiUpdate::GpuStatus(status)).await;
                }
                Err(e) => error!("GPU status error: {}", e),
            }
        })
    }

    /// Downloads `link` from the service and writes it to `target`.
    pub fn save_artifact(&mut self, link: String, target: PathBuf) -> JoinHandle<()> {
        let api = self.api.clone();
        let update_tx = self.update_tx.clone();
        self.runtime.spawn(async move {
            debug!("Saving {} to {}", link, target.display());
            let outcome = match api.download(&link).await {
                Ok(bytes) => tokio::fs::write(&target, bytes)
                    .await
                    .map(|_| target)
                    .map_err(|e| AppError::Io(e).to_string()),
                Err(e) => Err(AppError::Api(e).to_string()),
            };
            if let Err(e) = &outcome {
                error!("Failed to save {}: {}", link, e);
            }
            let _ = update_tx.send(UiUpdate::ArtifactSaved(outcome)).await;
        })
    }

    /// Logs whether the service answers `/health`.
    pub fn check_health(&self) -> JoinHandle<()> {
        let api = self.api.clone();
        self.runtime.spawn(async move {
            match api.health().await {
                Ok(health) => {
                    let device = health
                        .gpu
                        .as_ref()
                        .and_then(|gpu| gpu.device())
                        .and_then(|gpu| gpu.name.clone())
                        .unwrap_or_else(|| "CPU".to_string());
                    info!("Depth service is {} on {}", health.status, device);
                }
                Err(e) => warn!("Depth service health check failed: {}", e),
            }
        })
    }
}

impl Drop for PageController {
    fn drop(&mut self) {
        self.stop();
    }
}
