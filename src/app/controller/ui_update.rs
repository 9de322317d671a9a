use std::path::PathBuf;
use std::time::Duration;

use crate::api::{DepthResult, GpuStatus};
use crate::error::ApiError;

/// Messages from background tasks to the UI thread.
#[derive(Debug)]
pub enum UiUpdate {
    GpuStatus(GpuStatus),
    PredictStarted,
    PredictFinished {
        outcome: Result<DepthResult, ApiError>,
        elapsed: Duration,
    },
    ArtifactSaved(Result<PathBuf, String>),
}
