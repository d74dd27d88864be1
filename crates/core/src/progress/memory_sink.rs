//! In-process progress sink.

use std::sync::{Mutex, MutexGuard};

use super::state::{NO_LOG, WAITING};
use super::traits::ProgressSink;

/// Mutex-guarded latest message plus an in-memory log.
#[derive(Debug, Default)]
pub struct MemoryProgressSink {
    current: Mutex<Option<String>>,
    log: Mutex<Vec<String>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MemoryProgressSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every log entry written so far, oldest first.
    pub fn log_entries(&self) -> Vec<String> {
        lock(&self.log).clone()
    }
}

impl ProgressSink for MemoryProgressSink {
    fn set_progress(&self, message: &str) {
        *lock(&self.current) = Some(message.to_string());
    }

    fn progress(&self) -> String {
        match lock(&self.current).as_deref() {
            Some(message) if !message.trim().is_empty() => message.trim().to_string(),
            _ => WAITING.to_string(),
        }
    }

    fn clear_progress(&self) {
        *lock(&self.current) = None;
    }

    fn append_log(&self, message: &str) {
        lock(&self.log).push(message.to_string());
    }

    fn log_tail(&self, lines: usize) -> String {
        let log = lock(&self.log);
        if log.is_empty() {
            return NO_LOG.to_string();
        }
        let start = log.len().saturating_sub(lines);
        log[start..].join("\n")
    }

    fn clear_logs(&self) {
        lock(&self.log).clear();
        self.clear_progress();
    }
}
