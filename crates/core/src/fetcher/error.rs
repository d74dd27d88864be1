//! Error types for the fetcher module.

use thiserror::Error;

use crate::command::RequestError;
use crate::resolver::{ResolveError, Tool};
use crate::runner::RunError;

/// Errors surfaced by a [`MediaFetcher`](super::MediaFetcher).
///
/// A download that runs and exits nonzero is not an error; it comes back as a
/// failed [`DownloadReport`](super::DownloadReport).
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Run(#[from] RunError),

    /// The blocking worker panicked or was cancelled.
    #[error("Download worker failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// A tool was found but its version check failed.
    #[error("{tool} check failed: {reason}")]
    ToolCheck { tool: Tool, reason: String },
}

impl FetchError {
    pub fn tool_check(tool: Tool, reason: impl Into<String>) -> Self {
        Self::ToolCheck {
            tool,
            reason: reason.into(),
        }
    }

    /// Short text suitable for showing to an end user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Request(RequestError::EmptyUrl) => "ERROR: Invalid URL".to_string(),
            Self::Request(RequestError::UnsupportedUrl { .. }) => {
                "ERROR: Not a YouTube link".to_string()
            }
            Self::Resolve(_) | Self::ToolCheck { .. } => format!("ERROR: {}", self),
            Self::Run(_) | Self::Join(_) => format!("✗ Error: {}", self),
        }
    }
}
