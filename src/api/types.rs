use std::sync::Arc;

use base64::Engine;
use chrono::{DateTime, Local};
use serde::Deserialize;

use crate::common::{Colormap, SelectedImage};
use crate::error::ApiError;

/// Everything needed for one `POST /api/predict`.
#[derive(Debug, Clone)]
pub struct PredictRequest {
    pub image: SelectedImage,
    pub colormap: Colormap,
    /// Manual focal length in pixels, already validated as a positive number.
    pub focal_length: Option<String>,
}

impl PredictRequest {
    /// Text fields of the multipart body, in the order they are appended after `file`.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("colormap", self.colormap.as_str().to_string())];
        if let Some(focal_length) = &self.focal_length {
            fields.push(("focal_length", focal_length.clone()));
        }
        fields
    }
}

/// Raw `/api/predict` body. Success and failure share one shape.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct PredictPayload {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    task_id: Option<String>,
    #[serde(default)]
    depth_image_base64: Option<String>,
    #[serde(default)]
    min_depth_m: Option<f64>,
    #[serde(default)]
    max_depth_m: Option<f64>,
    #[serde(default)]
    mean_depth_m: Option<f64>,
    #[serde(default)]
    focal_length_px: Option<f64>,
    #[serde(default)]
    image_size: Option<String>,
    #[serde(default)]
    download_jpg: Option<String>,
    #[serde(default)]
    download_npz: Option<String>,
    #[serde(default)]
    download_16bit: Option<String>,
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::Decode(format!("missing field `{}`", field)))
}

impl PredictPayload {
    pub(crate) fn into_result(self, colormap: Colormap) -> Result<DepthResult, ApiError> {
        if let Some(message) = self.error.filter(|message| !message.is_empty()) {
            return Err(ApiError::Application(message));
        }

        let encoded = required(self.depth_image_base64, "depth_image_base64")?;
        let depth_image = base64::engine::general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| ApiError::Decode(format!("depth_image_base64: {}", e)))?;

        Ok(DepthResult {
            task_id: self.task_id,
            min_depth_m: required(self.min_depth_m, "min_depth_m")?,
            max_depth_m: required(self.max_depth_m, "max_depth_m")?,
            mean_depth_m: required(self.mean_depth_m, "mean_depth_m")?,
            focal_length_px: self.focal_length_px,
            image_size: self.image_size.filter(|size| !size.is_empty()),
            colormap,
            download_jpg: required(self.download_jpg, "download_jpg")?,
            download_npz: required(self.download_npz, "download_npz")?,
            download_16bit: self.download_16bit.filter(|link| !link.is_empty()),
            depth_image: Arc::from(depth_image),
        })
    }
}

/// Downloadable outputs of one prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    ColorJpg,
    DepthNpz,
    Depth16Png,
}

impl Artifact {
    pub fn label(&self) -> &'static str {
        match self {
            Artifact::ColorJpg => "JPG",
            Artifact::DepthNpz => "NPZ",
            Artifact::Depth16Png => "16-bit PNG",
        }
    }

    pub fn default_file_name(&self) -> &'static str {
        match self {
            Artifact::ColorJpg => "color.jpg",
            Artifact::DepthNpz => "depth.npz",
            Artifact::Depth16Png => "depth16.png",
        }
    }
}

/// A successful prediction. Only ever built from a response without `error`.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthResult {
    pub task_id: Option<String>,
    pub min_depth_m: f64,
    pub max_depth_m: f64,
    pub mean_depth_m: f64,
    pub focal_length_px: Option<f64>,
    pub image_size: Option<String>,
    pub colormap: Colormap,
    pub download_jpg: String,
    pub download_npz: String,
    pub download_16bit: Option<String>,
    /// Colorized depth map, JPEG encoded.
    pub depth_image: Arc<[u8]>,
}

impl DepthResult {
    pub fn min_depth_label(&self) -> String {
        format!("{:.2}", self.min_depth_m)
    }

    pub fn max_depth_label(&self) -> String {
        format!("{:.2}", self.max_depth_m)
    }

    pub fn mean_depth_label(&self) -> String {
        format!("{:.2}", self.mean_depth_m)
    }

    pub fn focal_length_label(&self) -> String {
        match self.focal_length_px {
            Some(focal) if focal > 0.0 => format!("{:.0}", focal),
            _ => "N/A".to_string(),
        }
    }

    /// Focal length with its unit, or a bare `N/A` when there is none.
    pub fn focal_length_display(&self) -> String {
        match self.focal_length_px {
            Some(focal) if focal > 0.0 => format!("{:.0} px", focal),
            _ => self.focal_length_label(),
        }
    }

    pub fn image_size_label(&self) -> &str {
        self.image_size.as_deref().unwrap_or("-")
    }

    /// File name offered in the save dialog, prefixed with the task id when the
    /// service sent one and with the local time otherwise.
    pub fn suggested_file_name(&self, artifact: Artifact, now: DateTime<Local>) -> String {
        let prefix = match &self.task_id {
            Some(task_id) => task_id.clone(),
            None => now.format("%Y%m%d-%H%M%S").to_string(),
        };
        format!("{}_{}", prefix, artifact.default_file_name())
    }

    /// jpg and npz always, the 16-bit png only when the service produced one.
    pub fn downloads(&self) -> Vec<(Artifact, &str)> {
        let mut links = vec![
            (Artifact::ColorJpg, self.download_jpg.as_str()),
            (Artifact::DepthNpz, self.download_npz.as_str()),
        ];
        if let Some(link) = &self.download_16bit {
            links.push((Artifact::Depth16Png, link.as_str()));
        }
        links
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GpuInfo {
    #[serde(default)]
    pub name: Option<String>,
    /// GB
    #[serde(default)]
    pub memory_used: f64,
    /// GB
    #[serde(default)]
    pub memory_total: f64,
}

impl GpuInfo {
    pub fn memory_fraction(&self) -> f32 {
        if self.memory_total <= 0.0 {
            return 0.0;
        }
        (self.memory_used / self.memory_total).clamp(0.0, 1.0) as f32
    }

    pub fn memory_label(&self) -> String {
        format!("{:.1} / {:.1} GB", self.memory_used, self.memory_total)
    }

    /// `NVIDIA GeForce RTX 4090` becomes `GeForce`.
    pub fn short_name(&self) -> String {
        let name = self.name.as_deref().unwrap_or_default();
        name.strip_prefix("NVIDIA ")
            .unwrap_or(name)
            .split(' ')
            .next()
            .unwrap_or_default()
            .to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GpuStatus {
    #[serde(default)]
    pub gpu: Option<GpuInfo>,
    #[serde(default)]
    pub model_loaded: bool,
}

impl GpuStatus {
    /// The device, if the service reported one with a name. An empty object means CPU only.
    pub fn device(&self) -> Option<&GpuInfo> {
        self.gpu
            .as_ref()
            .filter(|gpu| gpu.name.as_deref().is_some_and(|name| !name.is_empty()))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub gpu: Option<GpuStatus>,
}
