//! Trait definitions for the progress module.

use super::state::ProgressState;

/// A last-write-wins progress channel with an attached audit log.
///
/// Writes never fail from the caller's point of view: the channel is advisory,
/// so I/O problems are reported through `tracing` and otherwise swallowed.
pub trait ProgressSink: Send + Sync {
    /// Replaces the current message.
    fn set_progress(&self, message: &str);

    /// Returns the current message, or [`WAITING`](super::WAITING) if none.
    fn progress(&self) -> String;

    /// Resets the channel to its waiting state.
    fn clear_progress(&self);

    /// Appends one timestamped entry to the log.
    fn append_log(&self, message: &str);

    /// Returns the last `lines` log lines.
    fn log_tail(&self, lines: usize) -> String;

    /// Removes the log and the current message.
    fn clear_logs(&self);

    /// Current message parsed into a [`ProgressState`].
    fn state(&self) -> ProgressState {
        ProgressState::from_message(self.progress())
    }
}
