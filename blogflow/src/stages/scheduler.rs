//! Run scheduler.
//!
//! On every timer fire: no-op unless `ready.json` exists, read the daily
//! quota from `frequency.json` (default 1), count today's run folders and,
//! when under quota, create `generated/{run_id}/.run`.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use super::{Stage, Trigger};
use crate::core::{RunId, StageOutput};
use crate::errors::Result;
use crate::observability::StageLogger;
use crate::storage::{paths, BlobStore};
use crate::utils::{Clock, IdSource, RandomIds};

/// Runs per day when no policy is readable.
pub const DEFAULT_DAILY_RUNS: u32 = 1;

#[derive(Debug, Deserialize)]
struct FrequencyPolicy {
    daily: u32,
}

/// Creates at most `daily` runs per UTC day while the readiness flag is set.
pub struct RunScheduler {
    store: Arc<dyn BlobStore>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdSource>,
    logger: StageLogger,
}

impl std::fmt::Debug for RunScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunScheduler").finish_non_exhaustive()
    }
}

impl RunScheduler {
    /// Stage name.
    pub const NAME: &'static str = "run_scheduler";

    /// Creates the scheduler with random run id suffixes.
    #[must_use]
    pub fn new(store: Arc<dyn BlobStore>, clock: Arc<dyn Clock>, logger: StageLogger) -> Self {
        Self {
            store,
            clock,
            ids: Arc::new(RandomIds),
            logger,
        }
    }

    /// Replaces the source of run id suffixes.
    #[must_use]
    pub fn with_id_source(mut self, ids: Arc<dyn IdSource>) -> Self {
        self.ids = ids;
        self
    }

    async fn daily_quota(&self) -> Result<u32> {
        let Some(bytes) = self.store.read(paths::FREQUENCY_POLICY).await? else {
            return Ok(DEFAULT_DAILY_RUNS);
        };
        match serde_json::from_slice::<FrequencyPolicy>(&bytes) {
            Ok(policy) => Ok(policy.daily),
            Err(e) => {
                self.logger.warn(&format!(
                    "{} is malformed ({e}), using {DEFAULT_DAILY_RUNS}/day",
                    paths::FREQUENCY_POLICY
                ));
                Ok(DEFAULT_DAILY_RUNS)
            }
        }
    }

    async fn tick(&self) -> Result<StageOutput> {
        if !self.store.exists(paths::READY_FLAG).await? {
            return Ok(StageOutput::skip("readiness flag absent"));
        }

        let daily = self.daily_quota().await?;
        let now = self.clock.now();
        let today = now.date_naive();

        let keys = self.store.list(paths::GENERATED_PREFIX).await?;
        let runs_today = paths::run_ids_in(&keys)
            .iter()
            .filter(|id| id.is_from_date(today))
            .count();

        if runs_today >= daily as usize {
            return Ok(StageOutput::skip(format!(
                "daily quota reached ({runs_today}/{daily})"
            )));
        }

        let run_id = RunId::generate(now, self.ids.as_ref());
        let marker = paths::run_marker(&run_id);
        if self.store.exists(&marker).await? {
            return Ok(StageOutput::skip(format!("{marker} already exists")));
        }
        self.store.write(&marker, b"").await?;

        self.logger.info(&format!("Created run {run_id} ({}/{daily} today)", runs_today + 1));
        Ok(StageOutput::ok_value("run_id", serde_json::json!(run_id))
            .with_value("runs_today", serde_json::json!(runs_today + 1)))
    }
}

#[async_trait]
impl Stage for RunScheduler {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn execute(&self, _trigger: &Trigger) -> StageOutput {
        match self.tick().await {
            Ok(output) => output,
            Err(e) => {
                self.logger.error(&format!("Scheduler aborted ({:?}): {e}", e.kind()));
                StageOutput::fail(e.to_string())
            }
        }
    }
}
