//! Event sink trait and implementations.

use parking_lot::RwLock;
use serde::Serialize;

use crate::core::{StageOutput, StageStatus};

/// A stage lifecycle event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageEvent {
    /// Event type, e.g. `stage.completed`.
    pub event_type: String,
    /// Stage name.
    pub stage: String,
    /// What triggered the invocation (artifact key or `timer`).
    pub trigger: String,
    /// Duration, set on terminal events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,
    /// Skip reason or error message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl StageEvent {
    /// Event emitted before a stage runs.
    #[must_use]
    pub fn started(stage: &str, trigger: &str) -> Self {
        Self {
            event_type: "stage.started".to_string(),
            stage: stage.to_string(),
            trigger: trigger.to_string(),
            duration_ms: None,
            detail: None,
        }
    }

    /// Terminal event derived from the stage output.
    #[must_use]
    pub fn finished(stage: &str, trigger: &str, output: &StageOutput, duration_ms: f64) -> Self {
        let event_type = match output.status {
            StageStatus::Ok => "stage.completed",
            StageStatus::Skip => "stage.skipped",
            StageStatus::Fail => "stage.failed",
        };
        Self {
            event_type: event_type.to_string(),
            stage: stage.to_string(),
            trigger: trigger.to_string(),
            duration_ms: Some(duration_ms),
            detail: output.reason().map(ToString::to_string),
        }
    }
}

/// Receives stage events. Implementations must never fail the caller.
pub trait EventSink: Send + Sync {
    /// Emits an event.
    fn emit(&self, event: &StageEvent);
}

/// A no-op event sink that discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

impl EventSink for NoOpEventSink {
    fn emit(&self, _event: &StageEvent) {}
}

/// Writes events to the tracing subscriber.
///
/// `stage.started` goes to debug, failures to warn, everything else to info.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEventSink;

impl EventSink for LoggingEventSink {
    fn emit(&self, event: &StageEvent) {
        let duration_ms = event.duration_ms.unwrap_or_default();
        let detail = event.detail.as_deref().unwrap_or("");
        match event.event_type.as_str() {
            "stage.started" => {
                tracing::debug!(stage = %event.stage, trigger = %event.trigger, "{}", event.event_type);
            }
            "stage.failed" => tracing::warn!(
                stage = %event.stage,
                trigger = %event.trigger,
                duration_ms,
                detail,
                "{}", event.event_type
            ),
            _ => tracing::info!(
                stage = %event.stage,
                trigger = %event.trigger,
                duration_ms,
                detail,
                "{}", event.event_type
            ),
        }
    }
}

/// A collecting event sink for testing purposes.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: RwLock<Vec<StageEvent>>,
}

impl CollectingEventSink {
    /// Creates a new collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events.
    #[must_use]
    pub fn events(&self) -> Vec<StageEvent> {
        self.events.read().clone()
    }

    /// Returns the collected event types in order.
    #[must_use]
    pub fn event_types(&self) -> Vec<String> {
        self.events.read().iter().map(|e| e.event_type.clone()).collect()
    }

    /// Returns events for one stage.
    #[must_use]
    pub fn events_for(&self, stage: &str) -> Vec<StageEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.stage == stage)
            .cloned()
            .collect()
    }

    /// Returns the number of collected events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if no events have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}

impl EventSink for CollectingEventSink {
    fn emit(&self, event: &StageEvent) {
        self.events.write().push(event.clone());
    }
}
