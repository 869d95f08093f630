//! Stage trait and the pipeline stages.
//!
//! Stages are stateless units triggered by an external dispatcher. Each one
//! checks the artifacts it depends on, does its work and reports a
//! [`StageOutput`]; failures end up in the output or in an artifact, never
//! as a panic or an error returned to the trigger source.

pub mod domain_names;
pub mod integrations;
pub mod publisher;
pub mod scheduler;

pub use domain_names::DomainNameStage;
pub use integrations::IntegrationStubStage;
pub use publisher::PublisherStage;
pub use scheduler::RunScheduler;

use crate::core::StageOutput;
use async_trait::async_trait;
use std::fmt::{self, Debug};

/// What caused a stage invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// Periodic timer fire.
    Timer,
    /// An artifact was created under this key.
    ArtifactCreated(String),
}

impl Trigger {
    /// Artifact key, if the trigger is a storage event.
    #[must_use]
    pub fn artifact(&self) -> Option<&str> {
        match self {
            Self::Timer => None,
            Self::ArtifactCreated(key) => Some(key),
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timer => write!(f, "timer"),
            Self::ArtifactCreated(key) => write!(f, "{key}"),
        }
    }
}

/// Trait for pipeline stages.
#[async_trait]
pub trait Stage: Send + Sync + Debug {
    /// Returns the name of the stage.
    fn name(&self) -> &str;

    /// Executes the stage for one trigger.
    async fn execute(&self, trigger: &Trigger) -> StageOutput;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_display() {
        assert_eq!(Trigger::Timer.to_string(), "timer");
        assert_eq!(Trigger::ArtifactCreated("bootstrap.json".into()).to_string(), "bootstrap.json");
        assert_eq!(Trigger::ArtifactCreated("a/b".into()).artifact(), Some("a/b"));
        assert_eq!(Trigger::Timer.artifact(), None);
    }
}
