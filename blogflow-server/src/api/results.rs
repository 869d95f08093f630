//! Results logger endpoint.

use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use super::error::ApiResult;
use super::AppState;

/// POST /runs/{run_id}/results
/// Stores the posted JSON object as the run's results document.
pub async fn log_results(
    State(state): State<Arc<AppState>>,
    Path(run_id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    blogflow::results::log_results(state.store.as_ref(), &run_id, &body).await?;

    Ok(Json(json!({
        "status": "success",
        "message": format!("Results logged for run {}", run_id.trim()),
    })))
}
