//! Run identifiers and the documents stages write under a run prefix.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::IdSource;

const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";
const DATE_FORMAT: &str = "%Y%m%d";

/// Identifier of one pipeline run: `{UTC timestamp}_{8 hex chars}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    /// Generates an id stamped with `now` and suffixed from `ids`.
    #[must_use]
    pub fn generate(now: DateTime<Utc>, ids: &dyn IdSource) -> Self {
        Self(format!("{}_{}", now.format(TIMESTAMP_FORMAT), ids.next_suffix()))
    }

    /// Wraps an existing id (taken from a path or a request).
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns true if the id was stamped on the given UTC date.
    #[must_use]
    pub fn is_from_date(&self, date: NaiveDate) -> bool {
        self.0.starts_with(&date.format(DATE_FORMAT).to_string())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RunId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Outcome of a publish attempt as recorded in `publish.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
    /// The post exists on the remote site.
    Success,
    /// Publication failed; see `error_message`.
    Error,
}

/// The record a publisher invocation leaves behind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishResult {
    /// Run the content belongs to.
    #[serde(rename = "runId")]
    pub run_id: String,
    /// Post title that was sent.
    pub title: String,
    /// Final status.
    pub status: PublishStatus,
    /// Remote post id.
    pub post_id: Option<u64>,
    /// Remote post URL.
    pub post_url: Option<String>,
    /// When the post was confirmed.
    pub published_at: Option<DateTime<Utc>>,
    /// Verbatim failure description.
    pub error_message: Option<String>,
    /// Number of HTTP attempts made.
    #[serde(default)]
    pub attempts: u32,
    /// Free-form note, e.g. when the remote reported a duplicate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl PublishResult {
    /// Returns true if the status is success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == PublishStatus::Success
    }
}

/// One ranked domain name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainSuggestion {
    /// Fully-qualified domain.
    pub domain: String,
    /// Whether the registrar confirmed availability.
    pub available: bool,
    /// Price in major currency units.
    pub price: f64,
}
