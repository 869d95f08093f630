//! Health check and status page.

use axum::{extract::State, response::Html, Json};
use blogflow::storage::paths;
use serde_json::{json, Value};
use std::sync::Arc;

use super::error::ApiResult;
use super::AppState;

/// Runs listed on the status page.
pub const RECENT_RUNS: usize = 20;

/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.environment,
    }))
}

/// GET /
/// Minimal page listing the most recent runs, newest first.
pub async fn status_page(State(state): State<Arc<AppState>>) -> ApiResult<Html<String>> {
    let keys = state.store.list(paths::GENERATED_PREFIX).await?;
    let runs = paths::run_ids_in(&keys);

    let items: String = runs
        .iter()
        .rev()
        .take(RECENT_RUNS)
        .map(|id| format!("      <li><code>{}</code></li>\n", escape(id.as_str())))
        .collect();
    let list = if items.is_empty() {
        "    <p>No runs yet.</p>\n".to_string()
    } else {
        format!("    <ul>\n{items}    </ul>\n")
    };

    Ok(Html(format!(
        "<!doctype html>\n<html>\n  <head><title>blogflow</title></head>\n  <body>\n    \
         <h1>blogflow</h1>\n    <p>Environment: {}</p>\n    <h2>Recent runs ({} total)</h2>\n{list}  </body>\n</html>\n",
        escape(&state.environment),
        runs.len(),
    )))
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
