//! What a stage invocation reports back to the dispatcher.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::StageStatus;

/// Result of one stage invocation.
///
/// `message` carries the skip reason or the error; `data` holds whatever
/// the stage wants to surface (a created run id, a post id, counts).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageOutput {
    /// Outcome.
    pub status: StageStatus,
    /// Stage-specific values.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub data: Map<String, Value>,
    /// Skip reason or error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StageOutput {
    fn new(status: StageStatus, message: Option<String>) -> Self {
        Self {
            status,
            data: Map::new(),
            message,
        }
    }

    /// Work done, nothing to report.
    #[must_use]
    pub fn ok_empty() -> Self {
        Self::new(StageStatus::Ok, None)
    }

    /// Work done, reporting one value.
    #[must_use]
    pub fn ok_value(key: impl Into<String>, value: Value) -> Self {
        Self::ok_empty().with_value(key, value)
    }

    /// Nothing to do.
    #[must_use]
    pub fn skip(reason: impl Into<String>) -> Self {
        Self::new(StageStatus::Skip, Some(reason.into()))
    }

    /// The invocation failed.
    #[must_use]
    pub fn fail(error: impl Into<String>) -> Self {
        Self::new(StageStatus::Fail, Some(error.into()))
    }

    /// Adds a value.
    #[must_use]
    pub fn with_value(mut self, key: impl Into<String>, value: Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// Ok or skip.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Fail.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.status.is_failure()
    }

    /// Looks up a reported value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Skip reason or error, whichever applies.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.message.as_deref()
    }
}
