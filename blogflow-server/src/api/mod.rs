//! HTTP API: results logger and admin surface.

pub mod error;
pub mod health;
pub mod results;

use axum::{
    routing::{get, post},
    Router,
};
use blogflow::storage::BlobStore;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared handler state.
pub struct AppState {
    pub store: Arc<dyn BlobStore>,
    pub environment: String,
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health::status_page))
        .route("/health", get(health::health_check))
        .route("/runs/{run_id}/results", post(results::log_results))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use blogflow::storage::InMemoryBlobStore;
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use tower::ServiceExt;

    fn app(store: &InMemoryBlobStore) -> Router {
        create_router(Arc::new(AppState {
            store: Arc::new(store.clone()),
            environment: "test".to_string(),
        }))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let store = InMemoryBlobStore::new();
        let (status, body) = send(app(&store), Request::get("/health").body(Body::empty()).unwrap()).await;

        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({"status": "healthy", "version": "1.0.0", "environment": "test"}));
    }

    #[tokio::test]
    async fn test_log_results() {
        let store = InMemoryBlobStore::new();
        let (status, body) = send(app(&store), post_json("/runs/R1/results", r#"{"content":"one two three"}"#)).await;

        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "success");

        let stored: Value =
            serde_json::from_slice(&store.read("generated/R1/results.json").await.unwrap().unwrap()).unwrap();
        assert_eq!(stored["runId"], "R1");
        assert_eq!(stored["metrics"]["contentWordCount"], 3);
        assert_eq!(stored["metrics"]["apiLatencyMs"], 0);
    }

    #[tokio::test]
    async fn test_invalid_json_is_bad_request() {
        let store = InMemoryBlobStore::new();
        let (status, body) = send(app(&store), post_json("/runs/R1/results", "{nope")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "error");
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_blank_run_id_is_bad_request() {
        let store = InMemoryBlobStore::new();
        let (status, _) = send(app(&store), post_json("/runs/%20/results", "{}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_encoded_slash_in_run_id_is_bad_request() {
        let store = InMemoryBlobStore::new();
        let (status, body) = send(app(&store), post_json("/runs/a%2Fb/results", "{}")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "error");
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_storage_failure_is_internal_error() {
        let store = InMemoryBlobStore::new();
        store.fail_on("generated/R1/results.json");

        let (status, body) = send(app(&store), post_json("/runs/R1/results", "{}")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "error");
    }

    #[tokio::test]
    async fn test_status_page_lists_newest_first() {
        let store = InMemoryBlobStore::new();
        for day in 1..=25 {
            store
                .write(&format!("generated/202605{day:02}120000_abcdef01/.run"), b"")
                .await
                .unwrap();
        }
        store.write("generated/DomainNames.json", b"[]").await.unwrap();

        let (status, body) = send(app(&store), Request::get("/").body(Body::empty()).unwrap()).await;

        assert_eq!(status, StatusCode::OK);
        let html = String::from_utf8(body).unwrap();
        assert!(html.contains("Recent runs (25 total)"));
        assert_eq!(html.matches("<li>").count(), 20);
        let newest = html.find("20260525120000_abcdef01").unwrap();
        let older = html.find("20260510120000_abcdef01").unwrap();
        assert!(newest < older);
        assert!(!html.contains("20260505120000_abcdef01"));
    }

    #[tokio::test]
    async fn test_status_page_without_runs() {
        let store = InMemoryBlobStore::new();
        let (_, body) = send(app(&store), Request::get("/").body(Body::empty()).unwrap()).await;
        assert!(String::from_utf8(body).unwrap().contains("No runs yet."));
    }
}
