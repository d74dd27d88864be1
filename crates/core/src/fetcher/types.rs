use serde::Serialize;
use std::path::PathBuf;

use crate::command::MediaKind;
use crate::resolver::Tool;
use crate::runner::ProcessResult;

/// What a finished download run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadReport {
    pub kind: MediaKind,
    pub result: ProcessResult,
    /// Text shown to the user; includes the exit code on failure.
    pub message: String,
    pub download_dir: PathBuf,
}

impl DownloadReport {
    pub fn is_success(&self) -> bool {
        self.result.is_success()
    }
}

/// One resolved tool and the first line of its version output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolStatus {
    pub tool: Tool,
    pub path: PathBuf,
    pub version: String,
}
