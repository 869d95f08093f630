//! Trigger routing.
//!
//! The dispatcher owns one instance of every stage and maps each trigger to
//! the stages that react to it:
//!
//! | trigger                          | stages                              |
//! |----------------------------------|-------------------------------------|
//! | timer                            | run scheduler                       |
//! | `bootstrap.json`                 | domain names, integration stubs     |
//! | `generated/{run_id}/content.md`  | publisher                           |
//! | anything else                    | none                                |

use futures::future::join_all;
use std::sync::Arc;
use tracing::Instrument;

use crate::clients::{
    CmsClient, DomainRegistrar, EnvSecretStore, GoDaddyClient, Notifier, SendGridNotifier, WordPressClient,
};
use crate::config::Config;
use crate::core::StageOutput;
use crate::events::{EventSink, StageEvent};
use crate::observability::{LoggerRegistry, SpanTimer};
use crate::pipeline::{RetryConfig, TokioSleeper};
use crate::stages::{DomainNameStage, IntegrationStubStage, PublisherStage, RunScheduler, Stage, Trigger};
use crate::storage::{paths, BlobStore};
use crate::utils::SystemClock;

/// Which stage group a trigger belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Timer fire.
    Scheduler,
    /// Bootstrap marker created.
    Bootstrap,
    /// Run content created.
    Publish,
    /// Nobody cares.
    Ignored,
}

impl Route {
    /// Classifies `trigger`.
    #[must_use]
    pub fn of(trigger: &Trigger) -> Self {
        match trigger.artifact() {
            None => Self::Scheduler,
            Some(paths::BOOTSTRAP) => Self::Bootstrap,
            Some(key) if is_content_artifact(key) => Self::Publish,
            Some(_) => Self::Ignored,
        }
    }
}

fn is_content_artifact(key: &str) -> bool {
    paths::run_id_from_artifact(key).is_some() && key.ends_with(&format!("/{}", paths::CONTENT_FILE))
}

/// Routes triggers to stages and reports their lifecycle.
pub struct Dispatcher {
    scheduler: Arc<dyn Stage>,
    bootstrap: Vec<Arc<dyn Stage>>,
    publisher: Arc<dyn Stage>,
    events: Arc<dyn EventSink>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("scheduler", &self.scheduler.name())
            .field("bootstrap", &self.bootstrap.iter().map(|s| s.name()).collect::<Vec<_>>())
            .field("publisher", &self.publisher.name())
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Creates a dispatcher from already-built stages.
    #[must_use]
    pub fn new(
        scheduler: Arc<dyn Stage>,
        bootstrap: Vec<Arc<dyn Stage>>,
        publisher: Arc<dyn Stage>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            scheduler,
            bootstrap,
            publisher,
            events,
        }
    }

    /// Wires every stage from `config` with real clients.
    ///
    /// Missing registrar or WordPress credentials do not prevent startup; the
    /// affected stage fails each invocation with a configuration error.
    pub fn from_config(
        config: &Config,
        store: Arc<dyn BlobStore>,
        loggers: &LoggerRegistry,
        events: Arc<dyn EventSink>,
    ) -> Self {
        let clock = Arc::new(SystemClock);
        let sleeper = Arc::new(TokioSleeper);

        let registrar: Option<Arc<dyn DomainRegistrar>> = match config.domains.credentials() {
            Ok((key, secret)) => Some(Arc::new(GoDaddyClient::new(&config.domains.base_url, key, secret)) as Arc<dyn DomainRegistrar>),
            Err(e) => {
                tracing::warn!(error = %e, "Domain suggestions disabled");
                None
            }
        };

        let cms: Option<Arc<dyn CmsClient>> = match config.publisher.credentials() {
            Ok((site, user, password)) => Some(Arc::new(WordPressClient::new(site, user, password)) as Arc<dyn CmsClient>),
            Err(e) => {
                tracing::warn!(error = %e, "Publishing disabled");
                None
            }
        };

        let notifier: Option<Arc<dyn Notifier>> = match (
            &config.notify.sendgrid_api_key,
            &config.notify.from,
            &config.notify.to,
        ) {
            (Some(key), Some(from), Some(to)) => Some(Arc::new(SendGridNotifier::new(key, from, to)) as Arc<dyn Notifier>),
            _ => None,
        };

        let scheduler = RunScheduler::new(store.clone(), clock.clone(), loggers.get(RunScheduler::NAME));
        let domains = DomainNameStage::new(
            store.clone(),
            registrar,
            sleeper.clone(),
            config.domains.clone(),
            loggers.get(DomainNameStage::NAME),
        );
        let integrations = IntegrationStubStage::new(store.clone(), clock.clone(), loggers.get(IntegrationStubStage::NAME));

        let mut publisher = PublisherStage::new(
            store,
            cms,
            Arc::new(EnvSecretStore),
            clock,
            loggers.get(PublisherStage::NAME),
        )
        .with_retry(RetryConfig::default(), sleeper)
        .with_skip_if_published(config.publisher.skip_if_published);
        if let Some(notifier) = notifier {
            publisher = publisher.with_notifier(notifier);
        }

        let bootstrap: Vec<Arc<dyn Stage>> = vec![Arc::new(domains), Arc::new(integrations)];
        Self::new(
            Arc::new(scheduler),
            bootstrap,
            Arc::new(publisher),
            events,
        )
    }

    /// Runs every stage `trigger` routes to and returns their outputs by name.
    ///
    /// Bootstrap stages run concurrently; one failing does not affect the
    /// other.
    pub async fn dispatch(&self, trigger: &Trigger) -> Vec<(String, StageOutput)> {
        let span = tracing::info_span!("dispatch", trigger = %trigger);
        async move {
            match Route::of(trigger) {
                Route::Scheduler => vec![self.invoke(self.scheduler.as_ref(), trigger).await],
                Route::Publish => vec![self.invoke(self.publisher.as_ref(), trigger).await],
                Route::Bootstrap => {
                    join_all(self.bootstrap.iter().map(|stage| self.invoke(stage.as_ref(), trigger))).await
                }
                Route::Ignored => {
                    tracing::debug!("No stage handles this trigger");
                    Vec::new()
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn invoke(&self, stage: &dyn Stage, trigger: &Trigger) -> (String, StageOutput) {
        let name = stage.name().to_string();
        let trigger_label = trigger.to_string();
        self.events.emit(&StageEvent::started(&name, &trigger_label));

        let timer = SpanTimer::start(&name);
        let output = stage.execute(trigger).await;
        let duration_ms = timer.finish();

        self.events
            .emit(&StageEvent::finished(&name, &trigger_label, &output, duration_ms));
        (name, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StageStatus;
    use crate::events::CollectingEventSink;
    use crate::storage::InMemoryBlobStore;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    #[derive(Debug)]
    struct FixedStage {
        name: &'static str,
        status: StageStatus,
        calls: Mutex<Vec<Trigger>>,
    }

    impl FixedStage {
        fn new(name: &'static str, status: StageStatus) -> Arc<Self> {
            Arc::new(Self {
                name,
                status,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.lock().len()
        }
    }

    #[async_trait]
    impl Stage for FixedStage {
        fn name(&self) -> &str {
            self.name
        }

        async fn execute(&self, trigger: &Trigger) -> StageOutput {
            self.calls.lock().push(trigger.clone());
            match self.status {
                StageStatus::Ok => StageOutput::ok_empty(),
                StageStatus::Skip => StageOutput::skip("nothing to do"),
                StageStatus::Fail => StageOutput::fail("boom"),
            }
        }
    }

    struct Harness {
        scheduler: Arc<FixedStage>,
        domains: Arc<FixedStage>,
        integrations: Arc<FixedStage>,
        publisher: Arc<FixedStage>,
        events: Arc<CollectingEventSink>,
        dispatcher: Dispatcher,
    }

    fn harness(domains_status: StageStatus) -> Harness {
        let scheduler = FixedStage::new("run_scheduler", StageStatus::Ok);
        let domains = FixedStage::new("domain_names", domains_status);
        let integrations = FixedStage::new("integration_stubs", StageStatus::Ok);
        let publisher = FixedStage::new("publisher", StageStatus::Ok);
        let events = Arc::new(CollectingEventSink::new());
        let bootstrap: Vec<Arc<dyn Stage>> = vec![domains.clone(), integrations.clone()];
        let dispatcher = Dispatcher::new(
            scheduler.clone(),
            bootstrap,
            publisher.clone(),
            events.clone(),
        );
        Harness {
            scheduler,
            domains,
            integrations,
            publisher,
            events,
            dispatcher,
        }
    }

    fn created(key: &str) -> Trigger {
        Trigger::ArtifactCreated(key.to_string())
    }

    #[test]
    fn test_routes() {
        assert_eq!(Route::of(&Trigger::Timer), Route::Scheduler);
        assert_eq!(Route::of(&created("bootstrap.json")), Route::Bootstrap);
        assert_eq!(Route::of(&created("generated/R1/content.md")), Route::Publish);
        assert_eq!(Route::of(&created("generated/R1/publish.json")), Route::Ignored);
        assert_eq!(Route::of(&created("generated/R1/x/content.md")), Route::Ignored);
        assert_eq!(Route::of(&created("generated/bootstrap.json")), Route::Ignored);
        assert_eq!(Route::of(&created("ready.json")), Route::Ignored);
    }

    #[tokio::test]
    async fn test_timer_runs_scheduler_only() {
        let h = harness(StageStatus::Ok);
        let outputs = h.dispatcher.dispatch(&Trigger::Timer).await;

        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].0, "run_scheduler");
        assert_eq!(h.scheduler.calls(), 1);
        assert_eq!(h.publisher.calls(), 0);
        assert_eq!(h.events.event_types(), vec!["stage.started", "stage.completed"]);
    }

    #[tokio::test]
    async fn test_bootstrap_stages_are_isolated() {
        let h = harness(StageStatus::Fail);
        let outputs = h.dispatcher.dispatch(&created("bootstrap.json")).await;

        assert_eq!(outputs.len(), 2);
        assert_eq!(h.domains.calls(), 1);
        assert_eq!(h.integrations.calls(), 1);

        let domain_events = h.events.events_for("domain_names");
        assert_eq!(domain_events.last().unwrap().event_type, "stage.failed");
        assert_eq!(domain_events.last().unwrap().detail.as_deref(), Some("boom"));
        let stub_events = h.events.events_for("integration_stubs");
        assert_eq!(stub_events.last().unwrap().event_type, "stage.completed");
    }

    #[tokio::test]
    async fn test_content_goes_to_publisher() {
        let h = harness(StageStatus::Ok);
        let outputs = h.dispatcher.dispatch(&created("generated/R1/content.md")).await;

        assert_eq!(outputs[0].0, "publisher");
        assert_eq!(h.publisher.calls(), 1);
        let event = &h.events.events()[1];
        assert_eq!(event.trigger, "generated/R1/content.md");
        assert!(event.duration_ms.is_some());
    }

    #[tokio::test]
    async fn test_unrelated_artifacts_are_ignored() {
        let h = harness(StageStatus::Ok);
        assert!(h.dispatcher.dispatch(&created("generated/R1/publish.json")).await.is_empty());
        assert!(h.events.is_empty());
    }

    #[tokio::test]
    async fn test_from_config_wires_real_stages() {
        let store = InMemoryBlobStore::new();
        store.write(paths::READY_FLAG, b"{}").await.unwrap();
        let events = Arc::new(CollectingEventSink::new());
        let loggers = LoggerRegistry::new();
        let dispatcher = Dispatcher::from_config(&Config::default(), Arc::new(store.clone()), &loggers, events.clone());

        let outputs = dispatcher.dispatch(&Trigger::Timer).await;
        assert_eq!(outputs[0].1.status, StageStatus::Ok);
        assert_eq!(paths::run_ids_in(&store.keys()).len(), 1);

        // No registrar credentials: the domain stage fails, stubs still land.
        store.write(paths::THEME, br#"{"name": "x"}"#).await.unwrap();
        store.write(paths::TOPICS, b"[]").await.unwrap();
        let outputs = dispatcher.dispatch(&created(paths::BOOTSTRAP)).await;
        let status_of = |name: &str| outputs.iter().find(|(n, _)| n == name).map(|(_, o)| o.status);
        assert_eq!(status_of(DomainNameStage::NAME), Some(StageStatus::Fail));
        assert_eq!(status_of(IntegrationStubStage::NAME), Some(StageStatus::Ok));
        assert!(store.exists(paths::BOOTSTRAP_DONE).await.unwrap());

        assert_eq!(
            loggers.names(),
            vec!["domain_names", "integration_stubs", "publisher", "run_scheduler"]
        );
    }
}
