//! Progress Sink: the latest human-readable progress message plus an
//! append-only log.
//!
//! The sink is a single slot. Every write replaces the previous message and
//! nothing is queued, so a poller may miss intermediate states. Two backends
//! are provided:
//!
//! - [`FileProgressSink`]: two small text files, readable from another process.
//! - [`MemoryProgressSink`]: a mutex-guarded cell for same-process use.

mod file_sink;
mod memory_sink;
mod state;
mod traits;

pub use file_sink::FileProgressSink;
pub use memory_sink::MemoryProgressSink;
pub use state::{ProgressState, NO_LOG, READ_ERROR, WAITING};
pub use traits::ProgressSink;
