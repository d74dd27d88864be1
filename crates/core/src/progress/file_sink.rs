//! File-backed progress sink, pollable from another thread or process.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::state::{NO_LOG, READ_ERROR, WAITING};
use super::traits::ProgressSink;
use crate::config::PathsConfig;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Progress in one overwritten text file, log in one append-only text file.
#[derive(Debug, Clone)]
pub struct FileProgressSink {
    progress_path: PathBuf,
    log_path: PathBuf,
}

impl FileProgressSink {
    pub fn new(progress_path: PathBuf, log_path: PathBuf) -> Self {
        Self {
            progress_path,
            log_path,
        }
    }

    /// Uses `progress.txt` and `download.log` under the configured state dir.
    pub fn from_paths(paths: &PathsConfig) -> Self {
        Self::new(paths.progress_file(), paths.log_file())
    }

    pub fn progress_path(&self) -> &Path {
        &self.progress_path
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Writes a session separator with the start time to the log.
    pub fn write_session_banner(&self) {
        let started = chrono::Local::now().format(TIMESTAMP_FORMAT);
        let state_dir = self
            .log_path
            .parent()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let banner = format!(
            "\n{sep}\nSession started at {started}\nState directory: {state_dir}\n{sep}\n\n",
            sep = "=".repeat(60)
        );
        if let Err(e) = append_raw(&self.log_path, &banner) {
            warn!("Could not initialize log file {}: {}", self.log_path.display(), e);
        }
    }

    /// Replaces the progress file by renaming a fully written sibling over it,
    /// so readers see either the old or the new message.
    fn write_progress(&self, message: &str) -> io::Result<()> {
        ensure_parent(&self.progress_path)?;
        let mut tmp = self.progress_path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, message)?;
        fs::rename(&tmp, &self.progress_path)
    }
}

fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

fn append_raw(path: &Path, text: &str) -> io::Result<()> {
    ensure_parent(path)?;
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(text.as_bytes())
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

impl ProgressSink for FileProgressSink {
    fn set_progress(&self, message: &str) {
        if let Err(e) = self.write_progress(message) {
            warn!("Progress write error: {}", e);
        }
    }

    fn progress(&self) -> String {
        match fs::read_to_string(&self.progress_path) {
            Ok(content) => {
                let content = content.trim();
                if content.is_empty() {
                    WAITING.to_string()
                } else {
                    content.to_string()
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => WAITING.to_string(),
            Err(e) => {
                warn!("Error reading progress: {}", e);
                READ_ERROR.to_string()
            }
        }
    }

    fn clear_progress(&self) {
        match remove_if_exists(&self.progress_path) {
            Ok(()) => debug!("Progress file cleared"),
            Err(e) => warn!("Clear progress error: {}", e),
        }
    }

    fn append_log(&self, message: &str) {
        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT);
        let entry = format!("[{}] {}\n", timestamp, message);
        if let Err(e) = append_raw(&self.log_path, &entry) {
            warn!("Logging error: {} - message was: {}", e, message);
        }
    }

    fn log_tail(&self, lines: usize) -> String {
        match fs::read_to_string(&self.log_path) {
            Ok(content) => {
                let all: Vec<&str> = content.lines().collect();
                let start = all.len().saturating_sub(lines);
                all[start..].join("\n")
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => NO_LOG.to_string(),
            Err(e) => format!("Error reading log: {}", e),
        }
    }

    fn clear_logs(&self) {
        for path in [&self.log_path, &self.progress_path] {
            if let Err(e) = remove_if_exists(path) {
                warn!("Error clearing {}: {}", path.display(), e);
            }
        }
    }
}
