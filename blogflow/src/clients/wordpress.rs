//! WordPress REST client.
//!
//! [`WordPressClient::create_post`] performs exactly one HTTP attempt and
//! classifies the answer; the publisher's retry loop decides what to do next.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::pipeline::AttemptOutcome;

/// Note recorded when the site reports the post already exists.
pub const DUPLICATE_NOTE: &str = "post already exists";

/// Payload of `POST /wp-json/wp/v2/posts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPost {
    /// Post title.
    pub title: String,
    /// Post body (HTML or markdown, passed through).
    pub content: String,
    /// Always `publish`.
    pub status: String,
    /// URL slug.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Short summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    /// Tag names.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// What the site told us about the post.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PublishedPost {
    /// Remote post id.
    pub id: Option<u64>,
    /// Public URL.
    pub link: Option<String>,
    /// Set for duplicate posts.
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatedPost {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    link: Option<String>,
}

/// A content-management system that accepts new posts.
#[async_trait]
pub trait CmsClient: Send + Sync {
    /// Makes one attempt at creating `post`.
    async fn create_post(&self, post: &NewPost) -> AttemptOutcome<PublishedPost>;
}

/// Maps an HTTP answer onto the publish retry policy.
///
/// - 200/201: success with the returned id and link
/// - 409: success, the post already exists
/// - 5xx: retryable
/// - anything else: terminal
#[must_use]
pub fn classify_response(status: u16, body: &str) -> AttemptOutcome<PublishedPost> {
    match status {
        200 | 201 => {
            let created: CreatedPost = serde_json::from_str(body).unwrap_or(CreatedPost { id: None, link: None });
            AttemptOutcome::Success(PublishedPost {
                id: created.id,
                link: created.link,
                note: None,
            })
        }
        409 => AttemptOutcome::Success(PublishedPost {
            id: None,
            link: None,
            note: Some(DUPLICATE_NOTE.to_string()),
        }),
        s if s >= 500 => AttemptOutcome::Retryable(format!("HTTP {s}: {body}")),
        s => AttemptOutcome::Terminal(format!("HTTP {s}: {body}")),
    }
}

/// Client for one WordPress site, authenticating with an application password.
#[derive(Debug, Clone)]
pub struct WordPressClient {
    client: reqwest::Client,
    site_url: String,
    username: String,
    app_password: String,
}

impl WordPressClient {
    /// Creates a client for `site_url`.
    #[must_use]
    pub fn new(site_url: impl Into<String>, username: impl Into<String>, app_password: impl Into<String>) -> Self {
        Self {
            client: super::http_client(),
            site_url: site_url.into().trim_end_matches('/').to_string(),
            username: username.into(),
            app_password: app_password.into(),
        }
    }

    /// The posts endpoint.
    #[must_use]
    pub fn posts_url(&self) -> String {
        format!("{}/wp-json/wp/v2/posts", self.site_url)
    }
}

#[async_trait]
impl CmsClient for WordPressClient {
    async fn create_post(&self, post: &NewPost) -> AttemptOutcome<PublishedPost> {
        let resp = match self
            .client
            .post(self.posts_url())
            .basic_auth(&self.username, Some(&self.app_password))
            .json(post)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => return AttemptOutcome::Retryable(format!("request failed: {e}")),
        };

        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        classify_response(status, &body)
    }
}
