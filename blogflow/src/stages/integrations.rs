//! Integration stub stage.
//!
//! Triggered by `bootstrap.json`. Writes a placeholder configuration document
//! for each third-party integration a blog needs, then the
//! `generated/bootstrap.done.json` completion marker with per-stub metrics.
//! Stubs are rewritten on every invocation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;

use super::{Stage, Trigger};
use crate::core::StageOutput;
use crate::errors::{BlogflowError, Result};
use crate::observability::StageLogger;
use crate::storage::{self, paths, BlobStore};
use crate::utils::Clock;

/// Integrations that get a stub, in write order.
pub const INTEGRATIONS: [&str; 5] = [
    "google_analytics",
    "google_adsense",
    "amazon_associates",
    "mailchimp",
    "search_console",
];

/// Placeholder configuration for one integration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationStub {
    /// Machine name, also the file stem.
    pub name: String,
    /// Human-readable name.
    pub display_name: String,
    /// What the integration is for.
    pub description: String,
    /// Steps an operator follows to finish the setup.
    pub setup_instructions: Vec<String>,
    /// Settings to fill in.
    pub default_settings: Map<String, Value>,
    /// Always false for a stub.
    pub is_configured: bool,
    /// When the stub was written.
    pub generated_at: DateTime<Utc>,
}

impl IntegrationStub {
    /// Builds the stub for `name`, `None` for unknown integrations.
    #[must_use]
    pub fn for_integration(name: &str, generated_at: DateTime<Utc>) -> Option<Self> {
        let (display_name, description, steps, settings) = match name {
            "google_analytics" => (
                "Google Analytics",
                "Traffic and audience analytics.",
                &[
                    "Create a GA4 property for the blog domain",
                    "Copy the measurement id into measurement_id",
                ][..],
                json!({"measurement_id": "", "anonymize_ip": true}),
            ),
            "google_adsense" => (
                "Google AdSense",
                "Display advertising revenue.",
                &[
                    "Apply for an AdSense account with the blog domain",
                    "Copy the publisher id into publisher_id",
                    "Place the ad snippet in the monetization-snippet secret",
                ][..],
                json!({"publisher_id": "", "auto_ads": true}),
            ),
            "amazon_associates" => (
                "Amazon Associates",
                "Affiliate links to Amazon products.",
                &[
                    "Join the Amazon Associates program",
                    "Copy the tracking id into tracking_id",
                ][..],
                json!({"tracking_id": "", "marketplace": "US"}),
            ),
            "mailchimp" => (
                "Mailchimp",
                "Newsletter signups and campaigns.",
                &[
                    "Create an audience for the blog",
                    "Generate an API key",
                    "Copy the audience id into list_id",
                ][..],
                json!({"api_key": "", "list_id": "", "double_opt_in": true}),
            ),
            "search_console" => (
                "Google Search Console",
                "Search indexing and sitemap submission.",
                &[
                    "Add the blog domain as a property",
                    "Verify ownership with the DNS record",
                    "Submit the sitemap URL",
                ][..],
                json!({"site_url": "", "sitemap_path": "/sitemap.xml"}),
            ),
            _ => return None,
        };

        let default_settings = match settings {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        Some(Self {
            name: name.to_string(),
            display_name: display_name.to_string(),
            description: description.to_string(),
            setup_instructions: steps.iter().map(ToString::to_string).collect(),
            default_settings,
            is_configured: false,
            generated_at,
        })
    }
}

/// A stub that could not be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationError {
    /// Integration name.
    pub integration: String,
    /// Why it failed.
    pub error: String,
}

/// Contents of the completion marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationMetrics {
    /// When the last stub was attempted.
    pub completed_at: DateTime<Utc>,
    /// Stubs attempted.
    pub total: usize,
    /// Integrations whose stub was written.
    pub succeeded: Vec<String>,
    /// Integrations whose stub failed.
    pub errors: Vec<IntegrationError>,
}

/// Writes one stub document per integration.
pub struct IntegrationStubStage {
    store: Arc<dyn BlobStore>,
    clock: Arc<dyn Clock>,
    logger: StageLogger,
}

impl std::fmt::Debug for IntegrationStubStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntegrationStubStage").finish_non_exhaustive()
    }
}

impl IntegrationStubStage {
    /// Stage name.
    pub const NAME: &'static str = "integration_stubs";

    /// Creates the stage.
    #[must_use]
    pub fn new(store: Arc<dyn BlobStore>, clock: Arc<dyn Clock>, logger: StageLogger) -> Self {
        Self { store, clock, logger }
    }

    async fn write_stub(&self, name: &str) -> Result<()> {
        let stub = IntegrationStub::for_integration(name, self.clock.now())
            .ok_or_else(|| BlogflowError::config(format!("unknown integration {name}")))?;
        storage::write_json(self.store.as_ref(), &paths::integration(name), &stub).await
    }

    async fn run(&self) -> Result<IntegrationMetrics> {
        let mut succeeded = Vec::new();
        let mut errors = Vec::new();

        for name in INTEGRATIONS {
            match self.write_stub(name).await {
                Ok(()) => {
                    self.logger.debug(&format!("Wrote stub for {name}"));
                    succeeded.push(name.to_string());
                }
                Err(e) => {
                    self.logger.error(&format!("Stub for {name} failed: {e}"));
                    errors.push(IntegrationError {
                        integration: name.to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        let metrics = IntegrationMetrics {
            completed_at: self.clock.now(),
            total: INTEGRATIONS.len(),
            succeeded,
            errors,
        };
        storage::write_json(self.store.as_ref(), paths::BOOTSTRAP_DONE, &metrics).await?;
        Ok(metrics)
    }
}

#[async_trait]
impl Stage for IntegrationStubStage {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn execute(&self, _trigger: &Trigger) -> StageOutput {
        let metrics = match self.run().await {
            Ok(metrics) => metrics,
            Err(e) => {
                self.logger.error(&format!("Completion marker not written: {e}"));
                return StageOutput::fail(e.to_string());
            }
        };

        self.logger.info(&format!(
            "{}/{} integration stubs written",
            metrics.succeeded.len(),
            metrics.total
        ));

        if metrics.errors.is_empty() {
            StageOutput::ok_value("succeeded", json!(metrics.succeeded))
        } else {
            let message = metrics
                .errors
                .iter()
                .map(|e| format!("{}: {}", e.integration, e.error))
                .collect::<Vec<_>>()
                .join("; ");
            StageOutput::fail(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StageStatus;
    use crate::observability::LoggerRegistry;
    use crate::storage::InMemoryBlobStore;
    use crate::utils::FixedClock;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn stage(store: &InMemoryBlobStore) -> IntegrationStubStage {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2026, 5, 1, 9, 30, 0).unwrap());
        IntegrationStubStage::new(
            Arc::new(store.clone()),
            Arc::new(clock),
            LoggerRegistry::new().get(IntegrationStubStage::NAME),
        )
    }

    #[test]
    fn test_every_integration_has_a_stub() {
        let now = Utc::now();
        for name in INTEGRATIONS {
            let stub = IntegrationStub::for_integration(name, now).unwrap();
            assert_eq!(stub.name, name);
            assert!(!stub.is_configured);
            assert!(!stub.setup_instructions.is_empty());
            assert!(!stub.default_settings.is_empty());
        }
        assert!(IntegrationStub::for_integration("myspace", now).is_none());
    }

    #[tokio::test]
    async fn test_writes_all_stubs_and_marker() {
        let store = InMemoryBlobStore::new();
        let output = stage(&store).execute(&Trigger::ArtifactCreated(paths::BOOTSTRAP.into())).await;

        assert_eq!(output.status, StageStatus::Ok);
        for name in INTEGRATIONS {
            let stub: IntegrationStub = storage::read_json(&store, &paths::integration(name))
                .await
                .unwrap()
                .unwrap();
            assert_eq!(stub.generated_at, Utc.with_ymd_and_hms(2026, 5, 1, 9, 30, 0).unwrap());
        }

        let metrics: IntegrationMetrics = storage::read_json(&store, paths::BOOTSTRAP_DONE).await.unwrap().unwrap();
        assert_eq!(metrics.total, 5);
        assert_eq!(metrics.succeeded, INTEGRATIONS.iter().map(ToString::to_string).collect::<Vec<_>>());
        assert!(metrics.errors.is_empty());
    }

    #[tokio::test]
    async fn test_stub_document_shape() {
        let store = InMemoryBlobStore::new();
        stage(&store).execute(&Trigger::Timer).await;

        let doc: Value = storage::read_json(&store, "integrations/mailchimp.json").await.unwrap().unwrap();
        assert_eq!(doc["name"], "mailchimp");
        assert_eq!(doc["display_name"], "Mailchimp");
        assert_eq!(doc["is_configured"], false);
        assert!(doc["setup_instructions"].is_array());
        assert!(doc["default_settings"].is_object());
        assert!(doc["generated_at"].is_string());
    }

    #[tokio::test]
    async fn test_one_failure_does_not_block_the_rest() {
        let store = InMemoryBlobStore::new();
        store.fail_on(paths::integration("amazon_associates"));

        let output = stage(&store).execute(&Trigger::Timer).await;

        assert_eq!(output.status, StageStatus::Fail);
        assert!(output.reason().unwrap().starts_with("amazon_associates: "));
        assert!(store.exists(&paths::integration("mailchimp")).await.unwrap());
        assert!(store.exists(&paths::integration("search_console")).await.unwrap());

        let metrics: IntegrationMetrics = storage::read_json(&store, paths::BOOTSTRAP_DONE).await.unwrap().unwrap();
        assert_eq!(metrics.succeeded.len(), 4);
        assert_eq!(metrics.errors.len(), 1);
        assert_eq!(metrics.errors[0].integration, "amazon_associates");
    }

    #[tokio::test]
    async fn test_rewrites_on_every_invocation() {
        let store = InMemoryBlobStore::new();
        store.write(&paths::integration("mailchimp"), b"stale").await.unwrap();

        let stage = stage(&store);
        stage.execute(&Trigger::Timer).await;
        stage.execute(&Trigger::Timer).await;

        let doc: Value = storage::read_json(&store, "integrations/mailchimp.json").await.unwrap().unwrap();
        assert_eq!(doc["name"], "mailchimp");
    }

    #[tokio::test]
    async fn test_marker_failure_fails_stage() {
        let store = InMemoryBlobStore::new();
        store.fail_on(paths::BOOTSTRAP_DONE);

        let output = stage(&store).execute(&Trigger::Timer).await;
        assert_eq!(output.status, StageStatus::Fail);
        assert_eq!(store.len(), INTEGRATIONS.len());
    }
}
