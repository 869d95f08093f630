//! Tracing subscriber setup and the per-stage logger registry.
//!
//! Stages do not look loggers up in a process-wide cache. A
//! [`LoggerRegistry`] is built at startup and handed to whoever constructs
//! the stages; each stage gets a [`StageLogger`] carrying its own span.

use dashmap::DashMap;
use tracing::Span;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, LoggingConfig};
use crate::errors::{BlogflowError, Result};

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins over `config.default_filter`. Fails if a subscriber is
/// already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.default_filter))
        .map_err(|e| BlogflowError::config(format!("invalid log filter: {e}")))?;

    let (json, text) = match config.format {
        LogFormat::Json => (Some(fmt::layer().json().with_current_span(true)), None),
        LogFormat::Text => (None, Some(fmt::layer().with_target(true))),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(text)
        .try_init()
        .map_err(|e| BlogflowError::config(format!("tracing already initialised: {e}")))
}

/// Named logger bound to a stage span.
#[derive(Debug, Clone)]
pub struct StageLogger {
    name: String,
    span: Span,
}

impl StageLogger {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            span: tracing::info_span!("stage", stage = %name),
        }
    }

    /// Logger name (the stage name).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The span every event of this logger is attached to.
    #[must_use]
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Logs at info level.
    pub fn info(&self, message: &str) {
        tracing::info!(parent: &self.span, stage = %self.name, "{message}");
    }

    /// Logs at warn level.
    pub fn warn(&self, message: &str) {
        tracing::warn!(parent: &self.span, stage = %self.name, "{message}");
    }

    /// Logs at error level.
    pub fn error(&self, message: &str) {
        tracing::error!(parent: &self.span, stage = %self.name, "{message}");
    }

    /// Logs at debug level.
    pub fn debug(&self, message: &str) {
        tracing::debug!(parent: &self.span, stage = %self.name, "{message}");
    }
}

/// Hands out one [`StageLogger`] per name, creating it on first use.
#[derive(Debug, Default)]
pub struct LoggerRegistry {
    loggers: DashMap<String, StageLogger>,
}

impl LoggerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the logger for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> StageLogger {
        self.loggers
            .entry(name.to_string())
            .or_insert_with(|| StageLogger::new(name))
            .clone()
    }

    /// Names of the loggers created so far, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.loggers.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Returns the number of registered loggers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.loggers.len()
    }

    /// Returns true if no logger has been created.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.loggers.is_empty()
    }
}
