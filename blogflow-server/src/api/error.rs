//! API error handling.
//!
//! Every error leaves as `{"status": "error", "message": ...}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use blogflow::errors::BlogflowError;
use blogflow::results::ResultsError;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Storage(BlogflowError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Storage(err) => {
                tracing::error!(error = %err, "Storage error");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        };

        (status, Json(serde_json::json!({ "status": "error", "message": message }))).into_response()
    }
}

impl From<BlogflowError> for ApiError {
    fn from(err: BlogflowError) -> Self {
        ApiError::Storage(err)
    }
}

impl From<ResultsError> for ApiError {
    fn from(err: ResultsError) -> Self {
        match err {
            ResultsError::BadRequest(msg) => ApiError::BadRequest(msg),
            ResultsError::Storage(err) => ApiError::Storage(err),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
