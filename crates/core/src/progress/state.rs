use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::Serialize;

/// Reported when nothing has been written yet.
pub const WAITING: &str = "Waiting...";

/// Reported when the progress artifact exists but cannot be read.
pub const READ_ERROR: &str = "Error reading progress";

/// Reported by `log_tail` when there is no log yet.
pub const NO_LOG: &str = "No log file found";

static PERCENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+\.?\d*)%").expect("valid regex"));

/// One progress message, with the percentage extracted when present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressState {
    pub message: String,
    /// In `[0, 100]`.
    pub percent: Option<f32>,
}

impl ProgressState {
    pub fn waiting() -> Self {
        Self {
            message: WAITING.to_string(),
            percent: None,
        }
    }

    /// Wraps a message, pulling out the first `NN.N%` it contains.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let percent = PERCENT
            .captures(&message)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<f32>().ok())
            .map(|p| p.clamp(0.0, 100.0));
        Self { message, percent }
    }

    pub fn is_waiting(&self) -> bool {
        self.message == WAITING
    }
}

impl Default for ProgressState {
    fn default() -> Self {
        Self::waiting()
    }
}
