//! Mock fetcher for testing.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::command::DownloadRequest;
use crate::fetcher::{DownloadReport, FetchError, MediaFetcher, ToolStatus};
use crate::formats::AvailableFormats;
use crate::progress::ProgressSink;
use crate::resolver::Tool;
use crate::runner::ProcessResult;

/// A recorded download for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedDownload {
    pub request: DownloadRequest,
    pub success: bool,
}

/// Mock implementation of the [`MediaFetcher`] trait.
///
/// Writes the same start and outcome messages as the real fetcher, with a
/// configurable series of progress messages in between.
pub struct MockFetcher {
    sink: Arc<dyn ProgressSink>,
    downloads: Arc<RwLock<Vec<RecordedDownload>>>,
    formats: Arc<RwLock<AvailableFormats>>,
    next_error: Arc<RwLock<Option<FetchError>>>,
    exit_code: Arc<RwLock<i32>>,
    download_duration: Arc<RwLock<Duration>>,
    progress_steps: Arc<RwLock<Vec<String>>>,
    download_dir: PathBuf,
}

impl MockFetcher {
    pub fn new(sink: Arc<dyn ProgressSink>) -> Self {
        Self {
            sink,
            downloads: Arc::new(RwLock::new(Vec::new())),
            formats: Arc::new(RwLock::new(AvailableFormats::new())),
            next_error: Arc::new(RwLock::new(None)),
            exit_code: Arc::new(RwLock::new(0)),
            download_duration: Arc::new(RwLock::new(Duration::ZERO)),
            progress_steps: Arc::new(RwLock::new(Vec::new())),
            download_dir: PathBuf::from("/mock/downloads"),
        }
    }

    pub async fn recorded_downloads(&self) -> Vec<RecordedDownload> {
        self.downloads.read().await.clone()
    }

    pub async fn download_count(&self) -> usize {
        self.downloads.read().await.len()
    }

    pub async fn set_formats(&self, formats: AvailableFormats) {
        *self.formats.write().await = formats;
    }

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: FetchError) {
        *self.next_error.write().await = Some(error);
    }

    /// Exit code the simulated tool "returns".
    pub async fn set_exit_code(&self, code: i32) {
        *self.exit_code.write().await = code;
    }

    pub async fn set_download_duration(&self, duration: Duration) {
        *self.download_duration.write().await = duration;
    }

    /// Progress messages written, in order, while a download runs.
    pub async fn set_progress_steps(&self, steps: Vec<String>) {
        *self.progress_steps.write().await = steps;
    }

    async fn take_error(&self) -> Option<FetchError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl MediaFetcher for MockFetcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn list_formats(&self, _url: &str) -> AvailableFormats {
        self.formats.read().await.clone()
    }

    async fn download(&self, request: DownloadRequest) -> Result<DownloadReport, FetchError> {
        if let Some(err) = self.take_error().await {
            self.downloads.write().await.push(RecordedDownload {
                request,
                success: false,
            });
            return Err(err);
        }

        let kind = request.kind();
        self.sink.set_progress(&format!(
            "Starting {} download...",
            kind.label().to_lowercase()
        ));

        let steps = self.progress_steps.read().await.clone();
        let duration = *self.download_duration.read().await;
        let step = duration / u32::try_from(steps.len() + 1).unwrap_or(u32::MAX);
        for message in &steps {
            tokio::time::sleep(step).await;
            self.sink.set_progress(message);
            self.sink.append_log(message);
        }
        tokio::time::sleep(step).await;

        let result = ProcessResult::from_exit_code(*self.exit_code.read().await);
        let message = if result.is_success() {
            self.sink
                .set_progress(&format!("SUCCESS: {} download complete", kind.label()));
            format!(
                "✓ {} downloaded successfully!\n\nSaved to: {}",
                kind.label(),
                self.download_dir.display()
            )
        } else {
            self.sink
                .set_progress(&format!("ERROR: {} download failed", kind.label()));
            format!("✗ Download failed (error code: {})", result.exit_code)
        };

        self.downloads.write().await.push(RecordedDownload {
            request,
            success: result.is_success(),
        });

        Ok(DownloadReport {
            kind,
            result,
            message,
            download_dir: self.download_dir.clone(),
        })
    }

    async fn validate(&self) -> Result<Vec<ToolStatus>, FetchError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        Ok(Tool::all()
            .iter()
            .map(|&tool| ToolStatus {
                tool,
                path: PathBuf::from(format!("/mock/bin/{}", tool)),
                version: "mock 1.0".to_string(),
            })
            .collect())
    }
}
