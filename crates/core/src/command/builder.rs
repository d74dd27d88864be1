//! Argument construction for the fetcher.

use std::path::{Path, PathBuf};

use super::types::{CommandSpec, DownloadRequest, EnvOverlay, MediaKind};
use crate::config::DownloadConfig;
use crate::resolver::ResolvedBinary;

/// Output filename template, relative to the download directory.
const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

/// Builds fetcher invocations from requests.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    options: DownloadConfig,
    download_dir: PathBuf,
}

impl CommandBuilder {
    pub fn new(options: DownloadConfig, download_dir: PathBuf) -> Self {
        Self {
            options,
            download_dir,
        }
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Full output template passed with `-o`.
    pub fn output_template(&self) -> PathBuf {
        self.download_dir.join(OUTPUT_TEMPLATE)
    }

    /// Tiered selector: mp4+m4a under the cap, then any video+audio under the
    /// cap, then best combined under the cap, then anything.
    pub fn video_format_selector(max_height: u32) -> String {
        format!(
            "bestvideo[height<={h}][ext=mp4]+bestaudio[ext=m4a]/\
             bestvideo[height<={h}]+bestaudio/best[height<={h}]/best",
            h = max_height
        )
    }

    /// Builds the download command for `request`.
    pub fn build(
        &self,
        request: &DownloadRequest,
        fetcher: &ResolvedBinary,
        transcoder: &ResolvedBinary,
    ) -> CommandSpec {
        let transcoder_dir = transcoder
            .directory()
            .unwrap_or_else(|| transcoder.path())
            .to_path_buf();

        let mut args = match request.kind() {
            MediaKind::Video => vec![
                "-f".to_string(),
                Self::video_format_selector(request.max_height()),
                "-o".to_string(),
                self.output_template().to_string_lossy().to_string(),
                "--merge-output-format".to_string(),
                "mp4".to_string(),
            ],
            MediaKind::Audio => vec![
                "-f".to_string(),
                "bestaudio/best".to_string(),
                "-o".to_string(),
                self.output_template().to_string_lossy().to_string(),
                "--extract-audio".to_string(),
                "--audio-format".to_string(),
                self.options.audio_format.clone(),
                "--audio-quality".to_string(),
                self.options.audio_quality.clone(),
            ],
        };

        args.extend([
            "--ffmpeg-location".to_string(),
            transcoder_dir.to_string_lossy().to_string(),
        ]);
        self.push_request_headers(&mut args, request.url());
        self.push_reliability_flags(&mut args);

        if request.kind() == MediaKind::Video {
            args.extend([
                "--http-chunk-size".to_string(),
                self.options.http_chunk_size.clone(),
            ]);
        }

        // One progress update per line instead of carriage-return redraws.
        args.push("--newline".to_string());
        args.push(request.url().to_string());

        CommandSpec {
            program: fetcher.path().to_path_buf(),
            args,
            env: EnvOverlay {
                path_prepend: vec![transcoder_dir],
                ..Default::default()
            },
        }
    }

    /// Builds the metadata query (`-j <url>`) used to list formats.
    pub fn build_metadata_query(&self, url: &str, fetcher: &ResolvedBinary) -> CommandSpec {
        CommandSpec {
            program: fetcher.path().to_path_buf(),
            args: vec!["-j".to_string(), url.to_string()],
            env: EnvOverlay::default(),
        }
    }

    fn push_request_headers(&self, args: &mut Vec<String>, url: &str) {
        args.extend([
            "--user-agent".to_string(),
            self.options.user_agent.clone(),
            "--referer".to_string(),
            url.to_string(),
            "--add-header".to_string(),
            format!("Accept:{}", self.options.accept),
            "--add-header".to_string(),
            format!("Accept-Language:{}", self.options.accept_language),
        ]);
    }

    fn push_reliability_flags(&self, args: &mut Vec<String>) {
        args.extend([
            "--retries".to_string(),
            self.options.retries.to_string(),
            "--fragment-retries".to_string(),
            self.options.fragment_retries.to_string(),
            "--extractor-retries".to_string(),
            self.options.extractor_retries.to_string(),
            "--no-check-certificates".to_string(),
            "--geo-bypass".to_string(),
            "--sleep-requests".to_string(),
            self.options.sleep_requests_secs.to_string(),
        ]);
    }
}
