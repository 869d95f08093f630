//! Error types for the blogflow pipeline.
//!
//! Stages never raise these to the trigger source. They are turned into a
//! failed [`StageOutput`](crate::core::StageOutput) or recorded in an output
//! document; the taxonomy exists so that callers can tell configuration
//! problems from upstream ones.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Convenience result alias.
pub type Result<T> = std::result::Result<T, BlogflowError>;

/// The main error type for blogflow operations.
#[derive(Debug, Error)]
pub enum BlogflowError {
    /// A credential, required file or setting is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The blob store failed to read or write an artifact.
    #[error("Storage error for '{key}': {message}")]
    Storage {
        /// The artifact key involved.
        key: String,
        /// What went wrong.
        message: String,
    },

    /// An artifact path did not match the expected layout.
    #[error("Invalid artifact path '{0}'")]
    InvalidPath(String),

    /// A remote API answered with a non-success status.
    #[error("Upstream error (status {status}): {message}")]
    Upstream {
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    /// The request never produced a response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BlogflowError {
    /// Creates a storage error.
    #[must_use]
    pub fn storage(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Storage {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Returns the error class used in logs.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) | Self::InvalidPath(_) => ErrorKind::Configuration,
            Self::Upstream { status, .. } if *status >= 500 => ErrorKind::TransientUpstream,
            Self::Transport(_) => ErrorKind::TransientUpstream,
            Self::Upstream { status, .. } if *status == 409 => ErrorKind::Conflict,
            Self::Upstream { .. } => ErrorKind::TerminalUpstream,
            Self::Storage { .. } | Self::Io(_) | Self::Serialization(_) => ErrorKind::Storage,
        }
    }
}

impl From<reqwest::Error> for BlogflowError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for BlogflowError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Coarse error classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing credentials or inputs. The stage no-ops.
    Configuration,
    /// 5xx or network failures. Retried.
    TransientUpstream,
    /// 4xx other than 409. Recorded, never retried.
    TerminalUpstream,
    /// 409 or output-already-exists. Treated as success.
    Conflict,
    /// Local persistence failed.
    Storage,
}
