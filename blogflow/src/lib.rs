//! # blogflow
//!
//! Content-automation pipeline for a network of blogs.
//!
//! Independently triggered stages coordinate only through artifacts in a
//! blob store:
//!
//! - **Run scheduler**: creates `generated/{run_id}/.run` markers, at most
//!   `frequency.json`'s daily quota per UTC day, while `ready.json` exists
//! - **Domain suggestions**: ranks available domains for the blog theme
//! - **Integration stubs**: writes placeholder configs for third-party services
//! - **Publisher**: posts `generated/{run_id}/content.md` to WordPress with a
//!   bounded, classified retry policy
//! - **Results logger**: stores per-run metrics posted over HTTP
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use blogflow::prelude::*;
//!
//! let config = Config::from_env()?;
//! let store = Arc::new(FsBlobStore::new(&config.storage.root));
//! let dispatcher = Dispatcher::from_config(&config, store, &LoggerRegistry::new(), Arc::new(LoggingEventSink::default()));
//!
//! dispatcher.dispatch(&Trigger::Timer).await;
//! dispatcher.dispatch(&Trigger::ArtifactCreated("generated/R1/content.md".into())).await;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod clients;
pub mod config;
pub mod core;
pub mod dispatch;
pub mod errors;
pub mod events;
pub mod frontmatter;
pub mod observability;
pub mod pipeline;
pub mod results;
pub mod stages;
pub mod storage;
pub mod utils;

#[cfg(test)]
#[allow(missing_docs)]
mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::clients::{CmsClient, DomainRegistrar, Notifier, SecretStore};
    pub use crate::config::Config;
    pub use crate::core::{DomainSuggestion, PublishResult, PublishStatus, RunId, StageOutput, StageStatus};
    pub use crate::dispatch::{Dispatcher, Route};
    pub use crate::errors::{BlogflowError, Result};
    pub use crate::events::{EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::observability::{init_tracing, LoggerRegistry, StageLogger};
    pub use crate::pipeline::{run_with_retry, AttemptOutcome, RetryConfig, Sleeper};
    pub use crate::stages::{Stage, Trigger};
    pub use crate::storage::{BlobStore, FsBlobStore, InMemoryBlobStore};
    pub use crate::utils::{Clock, IdSource, RandomIds, SystemClock};
}
