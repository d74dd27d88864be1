//! Request and command types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Hosts accepted as download sources.
const SUPPORTED_HOSTS: &[&str] = &["youtube.com", "youtu.be"];

/// What the caller wants out of a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    /// Best video merged with best audio into mp4.
    Video,
    /// Audio only, extracted to mp3.
    Audio,
}

impl MediaKind {
    /// Prefix used in progress messages, e.g. "VIDEO: 42.5%".
    pub fn progress_prefix(&self) -> &'static str {
        match self {
            Self::Video => "VIDEO",
            Self::Audio => "AUDIO",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Video => "Video",
            Self::Audio => "Audio",
        }
    }
}

/// Target resolutions a video download can be capped at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "7680x4320")]
    Uhd8k,
    #[serde(rename = "3840x2160")]
    Uhd4k,
    #[serde(rename = "2560x1440")]
    Qhd,
    #[serde(rename = "1920x1080")]
    FullHd,
    #[serde(rename = "1280x720")]
    Hd,
}

impl Resolution {
    /// Every known resolution, largest first.
    pub const ALL: [Resolution; 5] = [
        Resolution::Uhd8k,
        Resolution::Uhd4k,
        Resolution::Qhd,
        Resolution::FullHd,
        Resolution::Hd,
    ];

    /// `{width}x{height}` label, as reported by the fetcher's metadata.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Uhd8k => "7680x4320",
            Self::Uhd4k => "3840x2160",
            Self::Qhd => "2560x1440",
            Self::FullHd => "1920x1080",
            Self::Hd => "1280x720",
        }
    }

    pub fn max_height(&self) -> u32 {
        match self {
            Self::Uhd8k => 4320,
            Self::Uhd4k => 2160,
            Self::Qhd => 1440,
            Self::FullHd => 1080,
            Self::Hd => 720,
        }
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Uhd8k => "8K",
            Self::Uhd4k => "4K",
            Self::Qhd => "2K",
            Self::FullHd => "1080p",
            Self::Hd => "720p",
        }
    }

    /// Name shown in quality pickers.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Uhd8k => "4320p (8K)",
            Self::Uhd4k => "2160p (4K)",
            Self::Qhd => "1440p (2K)",
            Self::FullHd => "1080p (Full HD)",
            Self::Hd => "720p (HD)",
        }
    }

    /// Parses a `WxH` label, a short name or a display name.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|r| {
            r.label() == label
                || r.display_name() == label
                || r.short_name().eq_ignore_ascii_case(label)
        })
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::FullHd
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Errors for malformed download requests.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("URL is empty")]
    EmptyUrl,

    #[error("Unsupported URL: {url}")]
    UnsupportedUrl { url: String },
}

/// A validated request to download one link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadRequest {
    url: String,
    kind: MediaKind,
    target_resolution: Option<Resolution>,
}

impl DownloadRequest {
    /// Validates the URL and normalises the resolution label.
    ///
    /// An unrecognised label is treated as absent.
    pub fn new(
        url: &str,
        kind: MediaKind,
        resolution_label: Option<&str>,
    ) -> Result<Self, RequestError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(RequestError::EmptyUrl);
        }
        if !is_supported_url(url) {
            return Err(RequestError::UnsupportedUrl {
                url: url.to_string(),
            });
        }

        Ok(Self {
            url: url.to_string(),
            kind,
            target_resolution: resolution_label.and_then(Resolution::from_label),
        })
    }

    pub fn video(url: &str, resolution_label: Option<&str>) -> Result<Self, RequestError> {
        Self::new(url, MediaKind::Video, resolution_label)
    }

    pub fn audio(url: &str) -> Result<Self, RequestError> {
        Self::new(url, MediaKind::Audio, None)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn target_resolution(&self) -> Option<Resolution> {
        self.target_resolution
    }

    /// Height cap for the video format selector; 1080 when unset.
    pub fn max_height(&self) -> u32 {
        self.target_resolution.unwrap_or_default().max_height()
    }
}

/// Whether `raw` points at a supported host. Scheme-less links are accepted.
pub(crate) fn is_supported_url(raw: &str) -> bool {
    // Without "://", "youtube.com:443/x" would parse with "youtube.com" as its scheme.
    let parsed = if raw.contains("://") {
        url::Url::parse(raw)
    } else {
        url::Url::parse(&format!("https://{}", raw))
    };
    let Ok(parsed) = parsed else {
        return false;
    };
    if !matches!(parsed.scheme(), "http" | "https") {
        return false;
    }

    let Some(host) = parsed.host_str() else {
        return false;
    };
    let host = host.to_ascii_lowercase();
    SUPPORTED_HOSTS
        .iter()
        .any(|supported| host == *supported || host.ends_with(&format!(".{}", supported)))
}

/// Environment changes applied to the child process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnvOverlay {
    /// Directories placed in front of the inherited `PATH`.
    pub path_prepend: Vec<PathBuf>,
    /// Extra variables set verbatim.
    pub vars: BTreeMap<String, String>,
}

impl EnvOverlay {
    pub fn is_empty(&self) -> bool {
        self.path_prepend.is_empty() && self.vars.is_empty()
    }
}

/// A fully materialised subprocess invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub env: EnvOverlay,
}

impl CommandSpec {
    /// Single-line rendering for logs.
    pub fn display(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}
