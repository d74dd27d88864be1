//! Error types for the format query.

use thiserror::Error;

use crate::resolver::ResolveError;

/// Reasons a format listing came back empty.
///
/// These never escape [`FormatQuery::list_formats`](super::FormatQuery::list_formats);
/// they are logged and turned into an empty result.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("Failed to start format query: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Timeout while fetching formats ({timeout_secs}s)")]
    Timeout { timeout_secs: u64 },

    #[error("Format query exited with code {code}")]
    NonZeroExit { code: i32, stderr: String },

    #[error("Failed to parse format metadata: {0}")]
    Parse(#[from] serde_json::Error),
}
