use serde::Serialize;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failure,
}

/// Exit code plus classification. Exit code 0 is the only success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProcessResult {
    /// `-1` when the child was killed by a signal.
    pub exit_code: i32,
    pub outcome: Outcome,
}

impl ProcessResult {
    pub fn from_exit_code(exit_code: i32) -> Self {
        let outcome = if exit_code == 0 {
            Outcome::Success
        } else {
            Outcome::Failure
        };
        Self { exit_code, outcome }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_classification() {
        assert!(ProcessResult::from_exit_code(0).is_success());
        let failed = ProcessResult::from_exit_code(2);
        assert_eq!(failed.outcome, Outcome::Failure);
        assert_eq!(failed.exit_code, 2);
        assert!(!ProcessResult::from_exit_code(-1).is_success());
    }
}
