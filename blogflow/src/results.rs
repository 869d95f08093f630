//! Results logger core.
//!
//! Accepts a JSON object for a run, derives the `metrics` block and stores
//! the document at `generated/{run_id}/results.json`, overwriting any
//! previous one. The HTTP surface lives in the server crate.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::core::RunId;
use crate::errors::BlogflowError;
use crate::storage::{self, paths, BlobStore};

/// Why a results document was rejected or not stored.
#[derive(Debug, Error)]
pub enum ResultsError {
    /// The caller sent something unusable.
    #[error("{0}")]
    BadRequest(String),

    /// The document could not be written.
    #[error(transparent)]
    Storage(#[from] BlogflowError),
}

/// Number of whitespace-separated words.
#[must_use]
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Parses `body` and fills in `runId` and the derived metrics.
pub fn enrich(run_id: &str, body: &[u8]) -> Result<Map<String, Value>, ResultsError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| ResultsError::BadRequest(format!("invalid JSON body: {e}")))?;
    let Value::Object(mut doc) = value else {
        return Err(ResultsError::BadRequest("body must be a JSON object".to_string()));
    };

    doc.entry("runId").or_insert_with(|| Value::String(run_id.to_string()));

    let content_words = doc.get("content").and_then(Value::as_str).map(word_count);
    let top_level_latency = doc.get("apiLatencyMs").cloned();

    let metrics = doc.entry("metrics").or_insert_with(|| Value::Object(Map::new()));
    let Value::Object(metrics) = metrics else {
        return Err(ResultsError::BadRequest("metrics must be a JSON object".to_string()));
    };

    if let Some(words) = content_words {
        metrics.insert("contentWordCount".to_string(), Value::from(words));
    }
    if !metrics.contains_key("apiLatencyMs") {
        metrics.insert("apiLatencyMs".to_string(), top_level_latency.unwrap_or_else(|| Value::from(0)));
    }

    Ok(doc)
}

/// Validates, enriches and stores the results of `run_id`.
///
/// Returns the stored document.
pub async fn log_results(store: &dyn BlobStore, run_id: &str, body: &[u8]) -> Result<Value, ResultsError> {
    let run_id = run_id.trim();
    if run_id.is_empty() {
        return Err(ResultsError::BadRequest("runId is required".to_string()));
    }
    if run_id.contains('/') {
        return Err(ResultsError::BadRequest(format!("runId '{run_id}' must be a single path segment")));
    }

    let doc = Value::Object(enrich(run_id, body)?);
    let key = paths::results(&RunId::new(run_id));

    match store.exists(&key).await {
        Ok(true) => tracing::info!(run_id, key = %key, "Overwriting existing results"),
        Ok(false) => {}
        Err(BlogflowError::InvalidPath(_)) => {
            return Err(ResultsError::BadRequest(format!("invalid runId '{run_id}'")));
        }
        Err(e) => return Err(e.into()),
    }

    storage::write_json(store, &key, &doc).await?;
    tracing::info!(run_id, key = %key, "Results logged");
    Ok(doc)
}
