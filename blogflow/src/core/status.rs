//! Stage status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a stage invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    /// Output produced.
    Ok,
    /// Nothing to do: output already present, quota reached, flag absent.
    Skip,
    /// See the output's message.
    Fail,
}

impl StageStatus {
    /// Wire and log name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Skip => "skip",
            Self::Fail => "fail",
        }
    }

    /// Skips count as success; the trigger was handled.
    #[must_use]
    pub fn is_success(self) -> bool {
        !self.is_failure()
    }

    /// Returns true for [`StageStatus::Fail`].
    #[must_use]
    pub fn is_failure(self) -> bool {
        self == Self::Fail
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_serde() {
        for status in [StageStatus::Ok, StageStatus::Skip, StageStatus::Fail] {
            assert_eq!(serde_json::to_value(status).unwrap(), status.to_string());
        }
    }

    #[test]
    fn test_skip_counts_as_success() {
        assert!(StageStatus::Skip.is_success());
        assert!(!StageStatus::Skip.is_failure());
        assert!(StageStatus::Fail.is_failure());
    }
}
