//! Error types for the runner module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while supervising a child process.
///
/// A nonzero exit is not an error; see [`ProcessResult`](super::ProcessResult).
#[derive(Debug, Error)]
pub enum RunError {
    /// The OS refused to start the program.
    #[error("Failed to start {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading the child's output or waiting for it failed mid-run.
    #[error("Error reading process output: {source}")]
    Stream {
        #[source]
        source: std::io::Error,
    },
}
