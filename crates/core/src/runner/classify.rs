//! Maps fetcher output lines onto progress messages.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::progress::ProgressState;

/// Marker the fetcher puts on download progress lines.
pub const DOWNLOAD_MARKER: &str = "[download]";

pub const MERGING_MESSAGE: &str = "Merging video and audio...";
pub const EXTRACTING_MESSAGE: &str = "Extracting audio...";
pub const PREPARING_MESSAGE: &str = "Preparing download...";
pub const UNEXPECTED_ERROR_MESSAGE: &str = "ERROR: Unexpected error occurred";

static PERCENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+\.?\d*)%").expect("valid regex"));

/// Classifies one output line; `None` means "log only".
///
/// Rules, first match wins:
/// 1. download marker and a percentage: `"<prefix>: <pct>%"`
/// 2. download marker and an ETA: `"<prefix>: <line>"`
/// 3. merging (case-insensitive)
/// 4. extracting
/// 5. destination announcement
///
/// A bare percentage without the download marker is not progress.
pub fn classify_line(line: &str, prefix: &str) -> Option<ProgressState> {
    let line = line.trim();

    if line.contains(DOWNLOAD_MARKER) {
        if let Some(percent) = PERCENT.captures(line).and_then(|caps| caps.get(1)) {
            return Some(ProgressState::from_message(format!(
                "{}: {}%",
                prefix,
                percent.as_str()
            )));
        }
        if line.contains("ETA") {
            return Some(ProgressState::from_message(format!("{}: {}", prefix, line)));
        }
    }

    let lower = line.to_lowercase();
    if lower.contains("merging") || lower.contains("merge") {
        return Some(ProgressState::from_message(MERGING_MESSAGE));
    }
    if line.contains("Extracting") {
        return Some(ProgressState::from_message(EXTRACTING_MESSAGE));
    }
    if line.contains("Destination") {
        return Some(ProgressState::from_message(PREPARING_MESSAGE));
    }

    None
}
