use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::api::{DepthApi, DepthResult, GpuStatus, HealthStatus, PredictRequest};
use crate::error::ApiError;

/// In-memory `DepthApi` that records what it was asked and replays canned responses.
pub(crate) struct FakeDepthApi {
    pub predict_response: Mutex<Result<DepthResult, ApiError>>,
    pub gpu_response: Mutex<Result<GpuStatus, ApiError>>,
    pub download_response: Mutex<Result<Vec<u8>, ApiError>>,
    pub requests: Mutex<Vec<PredictRequest>>,
    pub downloads: Mutex<Vec<String>>,
    pub gpu_calls: AtomicUsize,
    pub offload_calls: AtomicUsize,
}

impl FakeDepthApi {
    pub fn new(predict_response: Result<DepthResult, ApiError>) -> Self {
        Self {
            predict_response: Mutex::new(predict_response),
            gpu_response: Mutex::new(Ok(GpuStatus::default())),
            download_response: Mutex::new(Ok(Vec::new())),
            requests: Mutex::new(Vec::new()),
            downloads: Mutex::new(Vec::new()),
            gpu_calls: AtomicUsize::new(0),
            offload_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_gpu_response(self, response: Result<GpuStatus, ApiError>) -> Self {
        *self.gpu_response.lock().unwrap() = response;
        self
    }

    pub fn gpu_calls(&self) -> usize {
        self.gpu_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DepthApi for FakeDepthApi {
    async fn predict(&self, request: PredictRequest) -> Result<DepthResult, ApiError> {
        self.requests.lock().unwrap().push(request);
        self.predict_response.lock().unwrap().clone()
    }

    async fn gpu_status(&self) -> Result<GpuStatus, ApiError> {
        self.gpu_calls.fetch_add(1, Ordering::SeqCst);
        self.gpu_response.lock().unwrap().clone()
    }

    async fn offload_gpu(&self) -> Result<(), ApiError> {
        self.offload_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn health(&self) -> Result<HealthStatus, ApiError> {
        Ok(HealthStatus {
            status: "ok".to_string(),
            gpu: None,
        })
    }

    async fn download(&self, link: &str) -> Result<Vec<u8>, ApiError> {
        self.downloads.lock().unwrap().push(link.to_string());
        self.download_response.lock().unwrap().clone()
    }
}
