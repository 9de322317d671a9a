pub mod client;
pub mod types;

#[cfg(test)]
pub(crate) mod fake;

pub use client::{DepthApi, HttpDepthApi};
pub use types::{Artifact, DepthResult, GpuInfo, GpuStatus, HealthStatus, PredictRequest};
