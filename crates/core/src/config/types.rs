use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::resolver::{ExecutableSpec, Tool};

/// Name of the per-user state directory under the home directory.
const APP_DIR_NAME: &str = ".tubeloader";

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub download: DownloadConfig,
}

/// The executable table: one `ExecutableSpec` per logical tool.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default = "default_fetcher_spec")]
    pub fetcher: ExecutableSpec,
    #[serde(default = "default_transcoder_spec")]
    pub transcoder: ExecutableSpec,
}

impl ToolsConfig {
    /// Returns the lookup spec for a logical tool.
    pub fn spec(&self, tool: Tool) -> &ExecutableSpec {
        match tool {
            Tool::Fetcher => &self.fetcher,
            Tool::Transcoder => &self.transcoder,
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            fetcher: default_fetcher_spec(),
            transcoder: default_transcoder_spec(),
        }
    }
}

fn default_app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

fn bundled_candidates(names: &[&str]) -> Vec<PathBuf> {
    let installed = default_app_dir().join("binaries");
    let bundled = PathBuf::from("binaries");
    names
        .iter()
        .map(|name| installed.join(name))
        .chain(names.iter().map(|name| bundled.join(name)))
        .collect()
}

fn default_fetcher_spec() -> ExecutableSpec {
    ExecutableSpec::new("yt-dlp").with_candidates(bundled_candidates(&["yt-dlp"]))
}

fn default_transcoder_spec() -> ExecutableSpec {
    ExecutableSpec::new("ffmpeg").with_candidates(bundled_candidates(&[
        "ffmpeg",
        "ffmpeg-arm64",
        "ffmpeg-armv7",
    ]))
}

/// Filesystem locations used by the engine.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathsConfig {
    /// Root under which the output filename template is placed.
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,
    /// Holds the progress and log artifacts.
    #[serde(default = "default_app_dir")]
    pub state_dir: PathBuf,
}

impl PathsConfig {
    /// Latest-state progress artifact.
    pub fn progress_file(&self) -> PathBuf {
        self.state_dir.join("progress.txt")
    }

    /// Append-only log artifact.
    pub fn log_file(&self) -> PathBuf {
        self.state_dir.join("download.log")
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            state_dir: default_app_dir(),
        }
    }
}

fn default_download_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("Downloads")
    })
}

/// Flags handed to the fetcher on every download.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadConfig {
    /// Whole-job retry count (`--retries`).
    #[serde(default = "default_retries")]
    pub retries: u32,
    /// Per-fragment retry count (`--fragment-retries`).
    #[serde(default = "default_retries")]
    pub fragment_retries: u32,
    /// Extractor retry count (`--extractor-retries`).
    #[serde(default = "default_extractor_retries")]
    pub extractor_retries: u32,
    /// Fixed delay between requests, in seconds.
    #[serde(default = "default_sleep_requests")]
    pub sleep_requests_secs: u32,
    /// HTTP chunk size for video downloads (e.g. "10M").
    #[serde(default = "default_chunk_size")]
    pub http_chunk_size: String,
    #[serde(default = "default_audio_format")]
    pub audio_format: String,
    /// Audio quality passed to the extractor; "0" is best.
    #[serde(default = "default_audio_quality")]
    pub audio_quality: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_accept")]
    pub accept: String,
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
    /// Upper bound for the metadata (format list) query.
    #[serde(default = "default_format_query_timeout")]
    pub format_query_timeout_secs: u64,
}

fn default_retries() -> u32 {
    10
}

fn default_extractor_retries() -> u32 {
    5
}

fn default_sleep_requests() -> u32 {
    1
}

fn default_chunk_size() -> String {
    "10M".to_string()
}

fn default_audio_format() -> String {
    "mp3".to_string()
}

fn default_audio_quality() -> String {
    "0".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Linux; Android 13) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/118.0.0.0 Mobile Safari/537.36"
        .to_string()
}

fn default_accept() -> String {
    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".to_string()
}

fn default_accept_language() -> String {
    "en-us,en;q=0.5".to_string()
}

fn default_format_query_timeout() -> u64 {
    30
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            retries: default_retries(),
            fragment_retries: default_retries(),
            extractor_retries: default_extractor_retries(),
            sleep_requests_secs: default_sleep_requests(),
            http_chunk_size: default_chunk_size(),
            audio_format: default_audio_format(),
            audio_quality: default_audio_quality(),
            user_agent: default_user_agent(),
            accept: default_accept(),
            accept_language: default_accept_language(),
            format_query_timeout_secs: default_format_query_timeout(),
        }
    }
}
