//! Publisher stage.
//!
//! Triggered by `generated/{run_id}/content.md`. Parses the front-matter,
//! appends the monetization snippet, posts to WordPress under the bounded
//! retry policy and records exactly one [`PublishResult`] at
//! `generated/{run_id}/publish.json`.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use super::{Stage, Trigger};
use crate::clients::{CmsClient, NewPost, Notifier, PublishedPost, SecretStore, MONETIZATION_SNIPPET};
use crate::core::{PublishResult, PublishStatus, RunId, StageOutput};
use crate::errors::{BlogflowError, Result};
use crate::frontmatter::{self, ParsedContent};
use crate::observability::StageLogger;
use crate::pipeline::{run_with_retry, RetryConfig, RetryReport, Sleeper, TokioSleeper};
use crate::storage::{self, paths, BlobStore};
use crate::utils::Clock;

/// Post status sent to the CMS.
pub const POST_STATUS: &str = "publish";

/// Builds the post payload from parsed content and the monetization snippet.
#[must_use]
pub fn build_post(run_id: &RunId, parsed: &ParsedContent, snippet: &str) -> NewPost {
    let content = if snippet.is_empty() {
        parsed.body.clone()
    } else {
        format!("{}\n\n{snippet}", parsed.body.trim_end())
    };

    NewPost {
        title: parsed
            .get("title")
            .map_or_else(|| format!("Blog Post {run_id}"), ToString::to_string),
        content,
        status: POST_STATUS.to_string(),
        slug: parsed.get("slug").map(ToString::to_string),
        excerpt: parsed.get("description").map(ToString::to_string),
        tags: parsed.get("keywords").map(frontmatter::split_keywords).unwrap_or_default(),
    }
}

/// Subject and body of the notification sent for `result`.
#[must_use]
pub fn notification(result: &PublishResult) -> (String, String) {
    let status = match result.status {
        PublishStatus::Success => "success",
        PublishStatus::Error => "error",
    };
    let subject = format!("[blogflow] {status}: {}", result.title);

    let mut body = format!("Run: {}\nTitle: {}\nAttempts: {}\n", result.run_id, result.title, result.attempts);
    if let Some(url) = &result.post_url {
        body.push_str(&format!("URL: {url}\n"));
    }
    if let Some(note) = &result.note {
        body.push_str(&format!("Note: {note}\n"));
    }
    if let Some(error) = &result.error_message {
        body.push_str(&format!("Error: {error}\n"));
    }
    (subject, body)
}

/// Publishes generated content to the blog.
pub struct PublisherStage {
    store: Arc<dyn BlobStore>,
    cms: Option<Arc<dyn CmsClient>>,
    secrets: Arc<dyn SecretStore>,
    notifier: Option<Arc<dyn Notifier>>,
    retry: RetryConfig,
    sleeper: Arc<dyn Sleeper>,
    clock: Arc<dyn Clock>,
    skip_if_published: bool,
    logger: StageLogger,
}

impl std::fmt::Debug for PublisherStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublisherStage")
            .field("has_cms", &self.cms.is_some())
            .field("has_notifier", &self.notifier.is_some())
            .field("retry", &self.retry)
            .field("skip_if_published", &self.skip_if_published)
            .finish_non_exhaustive()
    }
}

impl PublisherStage {
    /// Stage name.
    pub const NAME: &'static str = "publisher";

    /// Creates the stage with the default retry policy and a real sleeper.
    ///
    /// A `None` CMS client means credentials are missing; invocations then
    /// fail without writing a result.
    #[must_use]
    pub fn new(
        store: Arc<dyn BlobStore>,
        cms: Option<Arc<dyn CmsClient>>,
        secrets: Arc<dyn SecretStore>,
        clock: Arc<dyn Clock>,
        logger: StageLogger,
    ) -> Self {
        Self {
            store,
            cms,
            secrets,
            notifier: None,
            retry: RetryConfig::default(),
            sleeper: Arc::new(TokioSleeper),
            clock,
            skip_if_published: true,
            logger,
        }
    }

    /// Sends a notification after each recorded result.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Replaces the retry policy and the sleeper used between attempts.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig, sleeper: Arc<dyn Sleeper>) -> Self {
        self.retry = retry;
        self.sleeper = sleeper;
        self
    }

    /// Sets whether an existing successful result suppresses publication.
    #[must_use]
    pub fn with_skip_if_published(mut self, skip: bool) -> Self {
        self.skip_if_published = skip;
        self
    }

    async fn already_published(&self, run_id: &RunId) -> bool {
        let key = paths::publish_result(run_id);
        match storage::read_json::<PublishResult>(self.store.as_ref(), &key).await {
            Ok(Some(prior)) if prior.is_success() => {
                if self.skip_if_published {
                    return true;
                }
                self.logger.warn(&format!("{key} already records a success, publishing again"));
                false
            }
            Ok(_) => false,
            Err(e) => {
                self.logger.warn(&format!("Ignoring unreadable {key}: {e}"));
                false
            }
        }
    }

    async fn snippet(&self) -> String {
        match self.secrets.get(MONETIZATION_SNIPPET).await {
            Ok(value) => value.unwrap_or_default(),
            Err(e) => {
                self.logger.warn(&format!("Secret {MONETIZATION_SNIPPET} unavailable: {e}"));
                String::new()
            }
        }
    }

    async fn publish(&self, cms: &dyn CmsClient, run_id: &RunId, key: &str) -> PublishResult {
        let text = match storage::read_text(self.store.as_ref(), key).await {
            Ok(Some(text)) => text,
            Ok(None) => {
                return Self::failed(run_id, format!("Blog Post {run_id}"), format!("{key} not found"), 0);
            }
            Err(e) => return Self::failed(run_id, format!("Blog Post {run_id}"), e.to_string(), 0),
        };

        let parsed = frontmatter::parse(&text);
        if let Some(warning) = &parsed.warning {
            self.logger.warn(&format!("{key}: {warning}"));
        }
        let post = build_post(run_id, &parsed, &self.snippet().await);

        let report: RetryReport<PublishedPost> =
            run_with_retry(&self.retry, self.sleeper.as_ref(), run_id.as_str(), |attempt| {
                self.logger.debug(&format!("Publishing '{}' (attempt {})", post.title, attempt + 1));
                cms.create_post(&post)
            })
            .await;

        match report.result {
            Ok(published) => PublishResult {
                run_id: run_id.to_string(),
                title: post.title,
                status: PublishStatus::Success,
                post_id: published.id,
                post_url: published.link,
                published_at: Some(self.clock.now()),
                error_message: None,
                attempts: report.attempts,
                note: published.note,
            },
            Err(error) => Self::failed(run_id, post.title, error, report.attempts),
        }
    }

    fn failed(run_id: &RunId, title: String, error: String, attempts: u32) -> PublishResult {
        PublishResult {
            run_id: run_id.to_string(),
            title,
            status: PublishStatus::Error,
            post_id: None,
            post_url: None,
            published_at: None,
            error_message: Some(error),
            attempts,
            note: None,
        }
    }

    async fn notify(&self, result: &PublishResult) {
        let Some(notifier) = &self.notifier else {
            return;
        };
        let (subject, body) = notification(result);
        if let Err(e) = notifier.notify(&subject, &body).await {
            self.logger.warn(&format!("Notification failed: {e}"));
        }
    }

    async fn run(&self, trigger: &Trigger) -> Result<StageOutput> {
        let key = trigger
            .artifact()
            .ok_or_else(|| BlogflowError::InvalidPath(trigger.to_string()))?;
        let run_id = paths::run_id_from_artifact(key).ok_or_else(|| BlogflowError::InvalidPath(key.to_string()))?;
        let cms = self
            .cms
            .as_deref()
            .ok_or_else(|| BlogflowError::config("WordPress credentials are not configured"))?;

        if self.already_published(&run_id).await {
            return Ok(StageOutput::skip(format!("run {run_id} is already published")));
        }

        let result = self.publish(cms, &run_id, key).await;
        storage::write_json(self.store.as_ref(), &paths::publish_result(&run_id), &result).await?;
        self.notify(&result).await;

        if result.is_success() {
            self.logger.info(&format!(
                "Published run {run_id} as post {:?} after {} attempt(s)",
                result.post_id, result.attempts
            ));
            Ok(StageOutput::ok_value("post_id", json!(result.post_id)).with_value("attempts", json!(result.attempts)))
        } else {
            let error = result.error_message.unwrap_or_default();
            self.logger.error(&format!("Publishing run {run_id} failed: {error}"));
            Ok(StageOutput::fail(error).with_value("attempts", json!(result.attempts)))
        }
    }
}

#[async_trait]
impl Stage for PublisherStage {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn execute(&self, trigger: &Trigger) -> StageOutput {
        match self.run(trigger).await {
            Ok(output) => output,
            Err(e) => {
                self.logger.error(&format!("Publisher aborted ({:?}): {e}", e.kind()));
                StageOutput::fail(e.to_string())
            }
        }
    }
}
