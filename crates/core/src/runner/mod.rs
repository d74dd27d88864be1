//! Supervised execution of a [`CommandSpec`](crate::command::CommandSpec).
//!
//! The runner spawns the child with stdout and stderr joined onto one pipe,
//! reads it line by line on the calling thread, appends every line to the
//! sink's log, and turns recognised lines into progress messages. It blocks
//! until the child exits, so callers run it on a dedicated thread
//! (`tokio::task::spawn_blocking` in [`YtDlpFetcher`](crate::fetcher::YtDlpFetcher)).
//!
//! There is no cancellation here: a spawned child runs to completion.

mod classify;
mod error;
mod process;
mod types;

pub use classify::{
    classify_line, DOWNLOAD_MARKER, EXTRACTING_MESSAGE, MERGING_MESSAGE, PREPARING_MESSAGE,
    UNEXPECTED_ERROR_MESSAGE,
};
pub use error::RunError;
pub use process::ProcessRunner;
pub use types::{Outcome, ProcessResult};
pub(crate) use process::{apply_env, background_command};
