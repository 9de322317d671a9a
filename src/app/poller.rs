use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::api::DepthApi;
use crate::app::controller::UiUpdate;

/// Periodically fetches GPU status and forwards it to the UI.
///
/// The first poll fires immediately. Each poll is awaited before the next tick,
/// so polls never overlap. Failures are logged and otherwise ignored.
pub struct StatusPoller {
    poll_task: Option<JoinHandle<()>>,
    cancel_token: CancellationToken,
}

impl StatusPoller {
    pub fn start(
        api: Arc<dyn DepthApi>,
        interval: Duration,
        update_tx: Sender<UiUpdate>,
        runtime: &Handle,
    ) -> Self {
        let cancel_token = CancellationToken::new();

        Self {
            poll_task: Some(Self::start_poll_task(
                api,
                interval,
                update_tx,
                cancel_token.clone(),
                runtime,
            )),
            cancel_token,
        }
    }

    fn start_poll_task(
        api: Arc<dyn DepthApi>,
        interval: Duration,
        update_tx: Sender<UiUpdate>,
        cancel_token: CancellationToken,
        runtime: &Handle,
    ) -> JoinHandle<()> {
        runtime.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            debug!("Status poller started, interval {:?}", interval);

            loop {
                tokio::select! {
                    _ = cancel_token.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                let status = tokio::select! {
                    _ = cancel_token.cancelled() => break,
                    status = api.gpu_status() => status,
                };

                match status {
                    Ok(status) => {
                        if update_tx.send(UiUpdate::GpuStatus(status)).await.is_err() {
                            debug!("UI update channel closed, stopping status poller");
                            break;
                        }
                    }
                    Err(e) => {
                        error!("GPU status error: {}", e);
                    }
                }
            }
            debug!("Status poller stopped");
        })
    }

    pub fn is_running(&self) -> bool {
        self.poll_task
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    pub fn stop(&mut self) {
        self.cancel_token.cancel();
        if let Some(task) = self.poll_task.take() {
            task.abort();
        }
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeDepthApi;
    use crate::api::{GpuInfo, GpuStatus};
    use crate::error::ApiError;
    use tokio::sync::mpsc;

    fn gpu_status() -> GpuStatus {
        GpuStatus {
            gpu: Some(GpuInfo {
                name: Some("NVIDIA L4".to_string()),
                memory_used: 1.0,
                memory_total: 22.0,
            }),
            model_loaded: true,
        }
    }

    fn fake() -> FakeDepthApi {
        FakeDepthApi::new(Err(ApiError::Transport("unused".to_string())))
    }

    #[tokio::test]
    async fn test_first_poll_is_immediate() {
        let api = Arc::new(fake().with_gpu_response(Ok(gpu_status())));
        let (update_tx, mut update_rx) = mpsc::channel(8);
        let _poller = StatusPoller::start(
            api.clone(),
            Duration::from_secs(60),
            update_tx,
            &Handle::current(),
        );

        let update = tokio::time::timeout(Duration::from_secs(1), update_rx.recv())
            .await
            .expect("no status within a second")
            .expect("channel closed");
        match update {
            UiUpdate::GpuStatus(status) => assert_eq!(status, gpu_status()),
            other => panic!("unexpected update {:?}", other),
        }
        assert_eq!(api.gpu_calls(), 1);
    }

    #[tokio::test]
    async fn test_failures_are_ignored_and_polling_continues() {
        let api = Arc::new(
            fake().with_gpu_response(Err(ApiError::Transport("connection refused".to_string()))),
        );
        let (update_tx, mut update_rx) = mpsc::channel(8);
        let poller = StatusPoller::start(
            api.clone(),
            Duration::from_millis(10),
            update_tx,
            &Handle::current(),
        );

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(api.gpu_calls() >= 2);
        assert!(poller.is_running());
        assert!(update_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_stop_ends_polling() {
        let api = Arc::new(fake().with_gpu_response(Ok(gpu_status())));
        let (update_tx, mut update_rx) = mpsc::channel(64);
        let mut poller = StatusPoller::start(
            api.clone(),
            Duration::from_millis(10),
            update_tx,
            &Handle::current(),
        );

        update_rx.recv().await.expect("channel closed");
        poller.stop();
        assert!(!poller.is_running());

        // Drain anything sent before the stop, then make sure nothing follows.
        while update_rx.try_recv().is_ok() {}
        let calls = api.gpu_calls();
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(api.gpu_calls(), calls);
        assert!(update_rx.recv().await.is_none());
    }
}
