//! Core domain model types for blogflow.
//!
//! This module contains the fundamental types shared by every stage:
//! - Stage status enum and stage output
//! - Run identifiers and the published documents they own

mod output;
mod run;
mod status;

pub use output::StageOutput;
pub use run::{DomainSuggestion, PublishResult, PublishStatus, RunId};
pub use status::StageStatus;
