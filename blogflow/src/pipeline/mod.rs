//! Retry policy and suspension points shared by the stages.

mod retry;
mod sleep;

pub use retry::{run_with_retry, AttemptOutcome, RetryConfig, RetryReport};
pub use sleep::{RecordingSleeper, Sleeper, TokioSleeper};
