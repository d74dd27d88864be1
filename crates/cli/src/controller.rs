use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::info;

use tubeloader_core::{DownloadReport, DownloadRequest, FetchError, MediaFetcher, ProgressSink};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControllerError {
    #[error("A download is already running")]
    Busy,
}

/// Clears the busy flag when the worker finishes, even by panicking.
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runs at most one download at a time against a shared progress sink.
pub struct DownloadController {
    fetcher: Arc<dyn MediaFetcher>,
    sink: Arc<dyn ProgressSink>,
    busy: Arc<AtomicBool>,
}

impl DownloadController {
    pub fn new(fetcher: Arc<dyn MediaFetcher>, sink: Arc<dyn ProgressSink>) -> Self {
        Self {
            fetcher,
            sink,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Clears the progress slot and starts `request` on a background task.
    pub fn start(
        &self,
        request: DownloadRequest,
    ) -> Result<JoinHandle<Result<DownloadReport, FetchError>>, ControllerError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ControllerError::Busy);
        }
        let guard = BusyGuard(Arc::clone(&self.busy));

        self.sink.clear_progress();
        info!("Starting {} download via {}", request.kind().label(), self.fetcher.name());

        let fetcher = Arc::clone(&self.fetcher);
        Ok(tokio::spawn(async move {
            let _guard = guard;
            fetcher.download(request).await
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;
    use tubeloader_core::progress::WAITING;
    use tubeloader_core::testing::MockFetcher;
    use tubeloader_core::{FileProgressSink, MemoryProgressSink};

    fn controller() -> (Arc<MemoryProgressSink>, Arc<MockFetcher>, DownloadController) {
        let sink = Arc::new(MemoryProgressSink::new());
        let fetcher = Arc::new(MockFetcher::new(sink.clone()));
        let controller = DownloadController::new(fetcher.clone(), sink.clone());
        (sink, fetcher, controller)
    }

    fn request() -> DownloadRequest {
        DownloadRequest::video("https://youtu.be/abc", None).unwrap()
    }

    #[tokio::test]
    async fn test_second_start_is_busy() {
        let (_, fetcher, controller) = controller();
        fetcher
            .set_download_duration(Duration::from_millis(100))
            .await;

        let handle = controller.start(request()).unwrap();
        assert!(controller.is_busy());
        assert_eq!(
            controller.start(request()).unwrap_err(),
            ControllerError::Busy
        );

        handle.await.unwrap().unwrap();
        assert!(!controller.is_busy());
        assert_eq!(fetcher.download_count().await, 1);
    }

    #[tokio::test]
    async fn test_can_start_again_after_finish() {
        let (_, fetcher, controller) = controller();

        controller.start(request()).unwrap().await.unwrap().unwrap();
        controller.start(request()).unwrap().await.unwrap().unwrap();

        assert_eq!(fetcher.download_count().await, 2);
    }

    #[tokio::test]
    async fn test_start_clears_stale_progress() {
        let (sink, _, controller) = controller();
        sink.set_progress("SUCCESS: Video download complete");

        let handle = controller.start(request()).unwrap();
        // The worker has not been polled yet on this single-threaded runtime.
        assert_eq!(sink.progress(), WAITING);

        handle.await.unwrap().unwrap();
        assert_eq!(sink.progress(), "SUCCESS: Video download complete");
    }

    #[tokio::test]
    async fn test_failed_download_releases_slot() {
        let (sink, fetcher, controller) = controller();
        fetcher.set_exit_code(1).await;

        let report = controller.start(request()).unwrap().await.unwrap().unwrap();

        assert!(!report.is_success());
        assert_eq!(sink.progress(), "ERROR: Video download failed");
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn test_file_backed_progress_across_runs() {
        let temp_dir = TempDir::new().unwrap();
        let state_dir = temp_dir.path().join("state");
        let sink = Arc::new(FileProgressSink::new(
            state_dir.join("progress.txt"),
            state_dir.join("download.log"),
        ));
        let fetcher = Arc::new(MockFetcher::new(sink.clone()));
        fetcher
            .set_progress_steps(vec!["VIDEO: 42.0%".to_string()])
            .await;
        let controller = DownloadController::new(fetcher.clone(), sink.clone());

        sink.set_progress("ERROR: Video download failed");
        assert!(sink.progress_path().exists());

        let handle = controller.start(request()).unwrap();
        assert!(!sink.progress_path().exists());
        assert_eq!(sink.progress(), WAITING);

        handle.await.unwrap().unwrap();
        assert_eq!(sink.progress(), "SUCCESS: Video download complete");
        assert!(sink.log_tail(10).contains("VIDEO: 42.0%"));

        controller.start(request()).unwrap().await.unwrap().unwrap();
        assert_eq!(fetcher.download_count().await, 2);
        assert!(!controller.is_busy());
    }
}
