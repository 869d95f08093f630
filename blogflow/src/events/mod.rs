//! Stage lifecycle events.
//!
//! The dispatcher reports every stage invocation through an [`EventSink`]:
//! `stage.started` followed by exactly one of `stage.completed`,
//! `stage.skipped` or `stage.failed`.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink, StageEvent};
