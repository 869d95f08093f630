//! Bounded retry with classified attempt outcomes.
//!
//! Each attempt reports an explicit [`AttemptOutcome`]; the loop in
//! [`run_with_retry`] only sleeps and retries on
//! [`AttemptOutcome::Retryable`], stops immediately on
//! [`AttemptOutcome::Terminal`], and turns a retryable outcome on the final
//! attempt into a terminal failure.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

use super::sleep::Sleeper;

/// Exponential backoff policy: `base * 2^attempt`, capped at `max_delay_ms`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum attempts, including the first one.
    pub max_attempts: u32,
    /// Delay after the first failed attempt, in milliseconds.
    pub base_delay_ms: u64,
    /// Upper bound for a single delay, in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    /// Three attempts, sleeping 2^attempt seconds between them.
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            max_delay_ms: 30_000,
        }
    }
}

impl RetryConfig {
    /// Delay to wait after the failed attempt number `attempt` (0-based).
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let delay = self
            .base_delay_ms
            .saturating_mul(2u64.saturating_pow(attempt))
            .min(self.max_delay_ms);
        Duration::from_millis(delay)
    }
}

/// Classified result of one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome<T> {
    /// Done; stop retrying.
    Success(T),
    /// Transient failure; retry if budget remains.
    Retryable(String),
    /// Permanent failure; stop now.
    Terminal(String),
}

/// What the retry loop ended with.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryReport<T> {
    /// The value, or the last error message verbatim.
    pub result: Result<T, String>,
    /// Attempts made.
    pub attempts: u32,
    /// Sum of all backoff sleeps.
    pub total_delay: Duration,
}

/// Runs `operation` until it succeeds, fails terminally, or the attempt
/// budget is spent. `operation` receives the 0-based attempt number.
pub async fn run_with_retry<T, F, Fut>(
    config: &RetryConfig,
    sleeper: &dyn Sleeper,
    key: &str,
    mut operation: F,
) -> RetryReport<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = AttemptOutcome<T>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut total_delay = Duration::ZERO;
    let mut attempt = 0;

    loop {
        let outcome = operation(attempt).await;
        let attempts = attempt + 1;

        match outcome {
            AttemptOutcome::Success(value) => {
                return RetryReport { result: Ok(value), attempts, total_delay };
            }
            AttemptOutcome::Terminal(error) => {
                tracing::debug!(key, attempts, error = %error, "Terminal failure, not retrying");
                return RetryReport { result: Err(error), attempts, total_delay };
            }
            AttemptOutcome::Retryable(error) if attempts >= max_attempts => {
                tracing::warn!(key, attempts, error = %error, "Retry budget exhausted");
                return RetryReport { result: Err(error), attempts, total_delay };
            }
            AttemptOutcome::Retryable(error) => {
                let delay = config.delay_for(attempt);
                tracing::debug!(
                    key,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "Retrying after error"
                );
                sleeper.sleep(delay).await;
                total_delay += delay;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::RecordingSleeper;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_retry_config_default() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.base_delay_ms, 1000);
    }

    #[test]
    fn test_exponential_delays() {
        let config = RetryConfig::default();
        assert_eq!(config.delay_for(0), Duration::from_secs(1));
        assert_eq!(config.delay_for(1), Duration::from_secs(2));
        assert_eq!(config.delay_for(2), Duration::from_secs(4));
    }

    #[test]
    fn test_delay_capped_at_max() {
        let config = RetryConfig { max_delay_ms: 5000, ..RetryConfig::default() };
        assert_eq!(config.delay_for(10), Duration::from_millis(5000));
        assert_eq!(config.delay_for(u32::MAX), Duration::from_millis(5000));
    }

    #[tokio::test]
    async fn test_success_first_try() {
        let sleeper = RecordingSleeper::new();
        let report = run_with_retry(&RetryConfig::default(), &sleeper, "k", |_| async {
            AttemptOutcome::Success(42)
        })
        .await;

        assert_eq!(report.result, Ok(42));
        assert_eq!(report.attempts, 1);
        assert!(sleeper.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_success_after_two_retryable_failures() {
        let sleeper = RecordingSleeper::new();
        let report = run_with_retry(&RetryConfig::default(), &sleeper, "k", |attempt| async move {
            if attempt < 2 {
                AttemptOutcome::Retryable(format!("503 on attempt {attempt}"))
            } else {
                AttemptOutcome::Success("done")
            }
        })
        .await;

        assert_eq!(report.result, Ok("done"));
        assert_eq!(report.attempts, 3);
        assert_eq!(report.total_delay, Duration::from_secs(3));
        assert_eq!(sleeper.sleeps(), vec![Duration::from_secs(1), Duration::from_secs(2)]);
    }

    #[tokio::test]
    async fn test_terminal_stops_immediately() {
        let sleeper = RecordingSleeper::new();
        let report: RetryReport<()> = run_with_retry(&RetryConfig::default(), &sleeper, "k", |_| async {
            AttemptOutcome::Terminal("404 Not Found".to_string())
        })
        .await;

        assert_eq!(report.result, Err("404 Not Found".to_string()));
        assert_eq!(report.attempts, 1);
        assert_eq!(report.total_delay, Duration::ZERO);
    }

    #[tokio::test]
    async fn test_exhausted_budget_returns_last_error() {
        let sleeper = RecordingSleeper::new();
        let report: RetryReport<()> = run_with_retry(&RetryConfig::default(), &sleeper, "k", |attempt| async move {
            AttemptOutcome::Retryable(format!("failure {attempt}"))
        })
        .await;

        assert_eq!(report.result, Err("failure 2".to_string()));
        assert_eq!(report.attempts, 3);
        assert_eq!(sleeper.sleeps().len(), 2);
    }
}
