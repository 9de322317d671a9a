//! HTTP client for the remote depth service.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use tracing::debug;

use crate::api::types::{DepthResult, GpuStatus, HealthStatus, PredictPayload, PredictRequest};
use crate::error::ApiError;

const PREDICT_PATH: &str = "/api/predict";
const GPU_STATUS_PATH: &str = "/api/gpu/status";
const GPU_OFFLOAD_PATH: &str = "/api/gpu/offload";
const HEALTH_PATH: &str = "/health";

/// Endpoints of the depth service, as consumed by the page controller.
#[async_trait]
pub trait DepthApi: Send + Sync {
    async fn predict(&self, request: PredictRequest) -> Result<DepthResult, ApiError>;

    async fn gpu_status(&self) -> Result<GpuStatus, ApiError>;

    async fn offload_gpu(&self) -> Result<(), ApiError>;

    async fn health(&self) -> Result<HealthStatus, ApiError>;

    /// Fetches an artifact by the link returned from `predict`.
    async fn download(&self, link: &str) -> Result<Vec<u8>, ApiError>;
}

pub struct HttpDepthApi {
    base_url: String,
    http_client: reqwest::Client,
}

impl HttpDepthApi {
    pub fn new(base_url: impl Into<String>, http_client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            http_client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, link: &str) -> String {
        resolve_link(&self.base_url, link)
    }
}

/// Absolute links pass through; service-relative links are joined to `base_url`.
pub fn resolve_link(base_url: &str, link: &str) -> String {
    if link.starts_with("http://") || link.starts_with("https://") {
        return link.to_string();
    }
    let base = base_url.trim_end_matches('/');
    if link.starts_with('/') {
        format!("{}{}", base, link)
    } else {
        format!("{}/{}", base, link)
    }
}

#[async_trait]
impl DepthApi for HttpDepthApi {
    async fn predict(&self, request: PredictRequest) -> Result<DepthResult, ApiError> {
        let part = Part::bytes(request.image.bytes().to_vec())
            .file_name(request.image.name().to_string())
            .mime_str(request.image.media_type())?;

        let mut form = Form::new().part("file", part);
        for (name, value) in request.form_fields() {
            form = form.text(name, value);
        }

        debug!(
            "POST {} file={} colormap={} focal_length={:?}",
            PREDICT_PATH,
            request.image.name(),
            request.colormap,
            request.focal_length
        );

        let response = self
            .http_client
            .post(self.url(PREDICT_PATH))
            .multipart(form)
            .send()
            .await?;

        // Failures still carry a JSON body with `error`, so the status is only
        // consulted when the body is not JSON.
        let status = response.status();
        let body = response.bytes().await?;
        let payload: PredictPayload = match serde_json::from_slice(&body) {
            Ok(payload) => payload,
            Err(e) if status.is_success() => return Err(e.into()),
            Err(_) => return Err(ApiError::Transport(format!("HTTP {}", status))),
        };

        payload.into_result(request.colormap)
    }

    async fn gpu_status(&self) -> Result<GpuStatus, ApiError> {
        let status = self
            .http_client
            .get(self.url(GPU_STATUS_PATH))
            .send()
            .await?
            .error_for_status()?
            .json::<GpuStatus>()
            .await?;
        Ok(status)
    }

    async fn offload_gpu(&self) -> Result<(), ApiError> {
        self.http_client
            .post(self.url(GPU_OFFLOAD_PATH))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn health(&self) -> Result<HealthStatus, ApiError> {
        let health = self
            .http_client
            .get(self.url(HEALTH_PATH))
            .send()
            .await?
            .error_for_status()?
            .json::<HealthStatus>()
            .await?;
        Ok(health)
    }

    async fn download(&self, link: &str) -> Result<Vec<u8>, ApiError> {
        let bytes = self
            .http_client
            .get(self.url(link))
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{Colormap, SelectedImage};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Accepts one connection, answers it with `status` and `body`, and
    /// returns the raw request as text.
    async fn serve_once(
        status: &'static str,
        content_type: &'static str,
        body: String,
    ) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let read = socket.read(&mut chunk).await.unwrap();
                if read == 0 {
                    break;
                }
                raw.extend_from_slice(&chunk[..read]);
                if request_complete(&raw) {
                    break;
                }
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                content_type,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&raw).into_owned()
        });

        (base_url, server)
    }

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end].lines().find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.trim()
                .eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        });
        match content_length {
            Some(length) => raw.len() >= header_end + 4 + length,
            None => text.ends_with("--\r\n"),
        }
    }

    fn request(colormap: Colormap, focal_length: Option<&str>) -> PredictRequest {
        PredictRequest {
            image: SelectedImage::new("room.jpg", "image/jpeg", vec![0xff, 0xd8, 0xff, 0xe0]),
            colormap,
            focal_length: focal_length.map(str::to_string),
        }
    }

    fn success_body() -> String {
        serde_json::json!({
            "task_id": "a1b2c3d4",
            "focal_length_px": 1432.6,
            "min_depth_m": 0.8123,
            "max_depth_m": 12.5,
            "mean_depth_m": 3.14159,
            "image_size": "1536x1024",
            "depth_image_base64": "/9j/4AAQ",
            "download_npz": "/api/download/a1b2c3d4/depth.npz",
            "download_jpg": "/api/download/a1b2c3d4/color.jpg"
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_predict_sends_multipart_form() {
        let (base_url, server) = serve_once("200 OK", "application/json", success_body()).await;
        let api = HttpDepthApi::new(base_url, reqwest::Client::new());

        let result = api.predict(request(Colormap::Plasma, None)).await.unwrap();
        let raw = server.await.unwrap();

        assert!(raw.starts_with("POST /api/predict "));
        assert!(raw.contains("multipart/form-data; boundary="));
        assert!(raw.contains("name=\"file\"; filename=\"room.jpg\""));
        assert!(raw.to_ascii_lowercase().contains("content-type: image/jpeg"));
        assert!(raw.contains("name=\"colormap\"\r\n\r\nplasma\r\n"));
        assert!(!raw.contains("focal_length"));

        assert_eq!(result.task_id.as_deref(), Some("a1b2c3d4"));
        assert_eq!(result.colormap, Colormap::Plasma);
        assert_eq!(result.downloads().len(), 2);
    }

    #[tokio::test]
    async fn test_predict_sends_manual_focal_length() {
        let (base_url, server) = serve_once("200 OK", "application/json", success_body()).await;
        let api = HttpDepthApi::new(base_url, reqwest::Client::new());

        api.predict(request(Colormap::Turbo, Some("1200"))).await.unwrap();
        let raw = server.await.unwrap();

        assert!(raw.contains("name=\"colormap\"\r\n\r\nturbo\r\n"));
        assert!(raw.contains("name=\"focal_length\"\r\n\r\n1200\r\n"));
    }

    #[tokio::test]
    async fn test_error_status_with_json_body_is_application_error() {
        let body = serde_json::json!({ "error": "CUDA out of memory" }).to_string();
        let (base_url, server) =
            serve_once("500 Internal Server Error", "application/json", body).await;
        let api = HttpDepthApi::new(base_url, reqwest::Client::new());

        let outcome = api.predict(request(Colormap::Plasma, None)).await;
        server.await.unwrap();

        assert_eq!(
            outcome,
            Err(ApiError::Application("CUDA out of memory".to_string()))
        );
    }

    #[tokio::test]
    async fn test_error_status_without_json_is_transport_error() {
        let (base_url, server) =
            serve_once("502 Bad Gateway", "text/html", "<h1>Bad Gateway</h1>".to_string()).await;
        let api = HttpDepthApi::new(base_url, reqwest::Client::new());

        let outcome = api.predict(request(Colormap::Gray, None)).await;
        server.await.unwrap();

        match outcome {
            Err(ApiError::Transport(message)) => assert!(message.starts_with("HTTP 502"), "{}", message),
            other => panic!("expected transport error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_success_status_with_garbage_is_decode_error() {
        let (base_url, server) = serve_once("200 OK", "text/plain", "not json".to_string()).await;
        let api = HttpDepthApi::new(base_url, reqwest::Client::new());

        let outcome = api.predict(request(Colormap::Gray, None)).await;
        server.await.unwrap();

        assert!(matches!(outcome, Err(ApiError::Decode(_))));
    }

    #[test]
    fn test_resolve_relative_links() {
        assert_eq!(
            resolve_link("http://127.0.0.1:8500/", "/api/download/ab/color.jpg"),
            "http://127.0.0.1:8500/api/download/ab/color.jpg"
        );
        assert_eq!(
            resolve_link("http://127.0.0.1:8500", "api/gpu/status"),
            "http://127.0.0.1:8500/api/gpu/status"
        );
    }

    #[test]
    fn test_resolve_absolute_link_passes_through() {
        assert_eq!(
            resolve_link("http://127.0.0.1:8500", "https://cdn.example.com/x.npz"),
            "https://cdn.example.com/x.npz"
        );
    }

    #[test]
    fn test_endpoint_urls() {
        let api = HttpDepthApi::new("http://gpu-box:8500/", reqwest::Client::new());
        assert_eq!(api.url(PREDICT_PATH), "http://gpu-box:8500/api/predict");
        assert_eq!(api.url(HEALTH_PATH), "http://gpu-box:8500/health");
    }
}
