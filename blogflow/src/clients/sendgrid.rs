//! SendGrid notification client.

use async_trait::async_trait;
use serde_json::json;

use crate::errors::{BlogflowError, Result};

const SENDGRID_URL: &str = "https://api.sendgrid.com";

/// Delivers short plain-text notifications.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends one message.
    async fn notify(&self, subject: &str, body: &str) -> Result<()>;
}

/// Sends mail through the SendGrid v3 API.
#[derive(Debug, Clone)]
pub struct SendGridNotifier {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    from: String,
    to: String,
}

impl SendGridNotifier {
    /// Creates a notifier sending from `from` to `to`.
    #[must_use]
    pub fn new(api_key: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            client: super::http_client(),
            base_url: SENDGRID_URL.to_string(),
            api_key: api_key.into(),
            from: from.into(),
            to: to.into(),
        }
    }

    /// Points the notifier at another API host.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl Notifier for SendGridNotifier {
    async fn notify(&self, subject: &str, body: &str) -> Result<()> {
        let payload = json!({
            "personalizations": [{"to": [{"email": self.to}]}],
            "from": {"email": self.from},
            "subject": subject,
            "content": [{"type": "text/plain", "value": body}],
        });

        let resp = self
            .client
            .post(format!("{}/v3/mail/send", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(BlogflowError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        tracing::debug!(subject, "Notification sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{spawn_server, ScriptedResponses};
    use axum::extract::State;
    use axum::http::{HeaderMap, Uri};
    use axum::routing::post;
    use axum::{Json, Router};

    async fn fake_sendgrid(script: ScriptedResponses) -> String {
        let router = Router::new()
            .route(
                "/v3/mail/send",
                post(|State(s): State<ScriptedResponses>, uri: Uri, headers: HeaderMap, body: String| async move {
                    let (status, json) = s.record(uri.to_string(), headers, body);
                    (status, Json(json))
                }),
            )
            .with_state(script);
        spawn_server(router).await
    }

    #[tokio::test]
    async fn test_sends_mail() {
        let script = ScriptedResponses::new(vec![(202, serde_json::json!({}))]);
        let notifier = SendGridNotifier::new("SG.key", "bot@blog.example", "owner@blog.example")
            .with_base_url(fake_sendgrid(script.clone()).await);

        notifier.notify("[blogflow] success: Hi", "Published").await.unwrap();

        let request = &script.requests()[0];
        assert_eq!(request.headers["authorization"], "Bearer SG.key");
        let sent: serde_json::Value = serde_json::from_str(&request.body).unwrap();
        assert_eq!(sent["personalizations"][0]["to"][0]["email"], "owner@blog.example");
        assert_eq!(sent["subject"], "[blogflow] success: Hi");
    }

    #[tokio::test]
    async fn test_rejected_mail_is_upstream_error() {
        let script = ScriptedResponses::new(vec![(403, serde_json::json!({"errors": []}))]);
        let notifier = SendGridNotifier::new("bad", "a@b", "c@d").with_base_url(fake_sendgrid(script).await);

        let err = notifier.notify("s", "b").await.unwrap_err();
        assert!(matches!(err, BlogflowError::Upstream { status: 403, .. }));
    }
}
