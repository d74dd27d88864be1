//! yt-dlp backed fetcher.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::error::FetchError;
use super::traits::MediaFetcher;
use super::types::{DownloadReport, ToolStatus};
use crate::command::{CommandBuilder, DownloadRequest, MediaKind};
use crate::config::Config;
use crate::formats::{AvailableFormats, FormatQuery};
use crate::progress::{FileProgressSink, ProgressSink};
use crate::resolver::{BinaryResolver, Tool};
use crate::runner::{background_command, ProcessResult, ProcessRunner, UNEXPECTED_ERROR_MESSAGE};

/// Bounded wait for a tool's version check.
const VERSION_TIMEOUT: Duration = Duration::from_secs(5);

/// Drives yt-dlp (with ffmpeg as its helper) and reports into a progress sink.
pub struct YtDlpFetcher {
    resolver: BinaryResolver,
    builder: CommandBuilder,
    formats: FormatQuery,
    sink: Arc<dyn ProgressSink>,
    audio_format: String,
}

impl YtDlpFetcher {
    pub fn new(config: &Config, sink: Arc<dyn ProgressSink>) -> Self {
        let resolver = BinaryResolver::new(config.tools.clone());
        let builder = CommandBuilder::new(
            config.download.clone(),
            config.paths.download_dir().to_path_buf(),
        );
        let formats = FormatQuery::new(
            resolver.clone(),
            builder.clone(),
            Duration::from_secs(config.download.format_query_timeout_secs),
        );

        Self {
            resolver,
            builder,
            formats,
            sink,
            audio_format: config.download.audio_format.clone(),
        }
    }

    /// Reports into the file sink under the configured state directory.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config, Arc::new(FileProgressSink::from_paths(&config.paths)))
    }

    pub fn sink(&self) -> &Arc<dyn ProgressSink> {
        &self.sink
    }

    pub fn download_dir(&self) -> &Path {
        self.builder.download_dir()
    }

    fn success_message(&self, kind: MediaKind) -> String {
        let hint = match kind {
            MediaKind::Video => "Check your Downloads folder.".to_string(),
            MediaKind::Audio => format!(
                "Check your Downloads folder for the {} file.",
                self.audio_format.to_uppercase()
            ),
        };
        format!(
            "✓ {} downloaded successfully!\n\nSaved to: {}\n\n{}",
            kind.label(),
            self.download_dir().display(),
            hint
        )
    }

    fn failure_message(exit_code: i32) -> String {
        format!(
            "✗ Download failed (error code: {})\n\nPlease check:\n\
             • Internet connection\n• URL is valid\n• Storage permissions",
            exit_code
        )
    }

    /// Records a fault that interrupted a started run.
    fn fault(&self, err: FetchError) -> FetchError {
        error!("Unexpected error: {}", err);
        self.sink.append_log(&format!("Unexpected error: {:?}", err));
        self.sink.set_progress(UNEXPECTED_ERROR_MESSAGE);
        err
    }

    fn report(&self, kind: MediaKind, result: ProcessResult) -> DownloadReport {
        let label = kind.label();
        let message = if result.is_success() {
            self.sink
                .set_progress(&format!("SUCCESS: {} download complete", label));
            self.sink.append_log(&format!("{} download successful", label));
            info!("{} download successful", label);
            self.success_message(kind)
        } else {
            self.sink
                .set_progress(&format!("ERROR: {} download failed", label));
            self.sink.append_log(&format!(
                "{} download failed with code {}",
                label, result.exit_code
            ));
            warn!("{} download failed with code {}", label, result.exit_code);
            Self::failure_message(result.exit_code)
        };

        DownloadReport {
            kind,
            result,
            message,
            download_dir: self.download_dir().to_path_buf(),
        }
    }

    async fn check_tool(&self, tool: Tool) -> Result<ToolStatus, FetchError> {
        let resolved = self.resolver.resolve(tool)?;

        let mut command = tokio::process::Command::from(background_command(resolved.path()));
        command
            .arg(tool.version_arg())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(VERSION_TIMEOUT, command.output())
            .await
            .map_err(|_| {
                FetchError::tool_check(
                    tool,
                    format!("no answer within {}s", VERSION_TIMEOUT.as_secs()),
                )
            })?
            .map_err(|e| FetchError::tool_check(tool, e.to_string()))?;

        if !output.status.success() {
            return Err(FetchError::tool_check(
                tool,
                format!("exited with code {}", output.status.code().unwrap_or(-1)),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let version = stdout.lines().next().unwrap_or_default().trim().to_string();
        debug!("{} at {}: {}", tool, resolved.path().display(), version);

        Ok(ToolStatus {
            tool,
            path: resolved.path().to_path_buf(),
            version,
        })
    }
}

#[async_trait]
impl MediaFetcher for YtDlpFetcher {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn list_formats(&self, url: &str) -> AvailableFormats {
        self.formats.list_formats(url).await
    }

    async fn download(&self, request: DownloadRequest) -> Result<DownloadReport, FetchError> {
        let kind = request.kind();

        // Nothing is written to the sink until both tools are found.
        let transcoder = self.resolver.resolve(Tool::Transcoder).map_err(|e| {
            error!("Transcoder not available: {}", e);
            e
        })?;
        let fetcher = self.resolver.resolve(Tool::Fetcher).map_err(|e| {
            error!("Fetcher not available: {}", e);
            e
        })?;

        let spec = self.builder.build(&request, &fetcher, &transcoder);

        let noun = kind.label().to_lowercase();
        self.sink.append_log(&format!(
            "Transcoder verified at: {}",
            transcoder.path().display()
        ));
        self.sink
            .append_log(&format!("Starting {} download for: {}", noun, request.url()));
        if kind == MediaKind::Video {
            let selected = request
                .target_resolution()
                .map(|r| r.label())
                .unwrap_or("default");
            self.sink
                .append_log(&format!("Selected resolution: {}", selected));
        }
        self.sink.append_log(&format!(
            "Output template: {}",
            self.builder.output_template().display()
        ));
        self.sink
            .set_progress(&format!("Starting {} download...", noun));
        info!("Starting {} download for {}", noun, request.url());

        let runner = ProcessRunner::new(Arc::clone(&self.sink));
        let prefix = kind.progress_prefix();
        let result = match tokio::task::spawn_blocking(move || runner.run(&spec, prefix)).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => return Err(self.fault(e.into())),
            Err(e) => return Err(self.fault(e.into())),
        };

        Ok(self.report(kind, result))
    }

    async fn validate(&self) -> Result<Vec<ToolStatus>, FetchError> {
        let mut statuses = Vec::with_capacity(Tool::all().len());
        for &tool in Tool::all() {
            statuses.push(self.check_tool(tool).await?);
        }
        Ok(statuses)
    }
}
