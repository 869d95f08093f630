//! Test helpers: local HTTP servers standing in for remote APIs.

use axum::http::{HeaderMap, StatusCode};
use axum::Router;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// A request captured by a [`ScriptedResponses`] handler.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub uri: String,
    pub headers: HeaderMap,
    pub body: String,
}

/// Queue of canned responses; the last one repeats once the queue drains.
#[derive(Debug, Clone, Default)]
pub struct ScriptedResponses {
    responses: Arc<Mutex<VecDeque<(StatusCode, serde_json::Value)>>>,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl ScriptedResponses {
    pub fn new(responses: Vec<(u16, serde_json::Value)>) -> Self {
        let queue = responses
            .into_iter()
            .map(|(status, body)| (StatusCode::from_u16(status).unwrap(), body))
            .collect();
        Self {
            responses: Arc::new(Mutex::new(queue)),
            requests: Arc::default(),
        }
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().clone()
    }

    pub fn record(&self, uri: String, headers: HeaderMap, body: String) -> (StatusCode, serde_json::Value) {
        self.requests.lock().push(CapturedRequest { uri, headers, body });
        let mut queue = self.responses.lock();
        if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue.front().cloned().unwrap_or((StatusCode::OK, serde_json::json!({})))
        }
    }
}
