//! Wall-clock timing of stage invocations.

use std::time::Instant;

/// Times one stage invocation.
#[derive(Debug)]
pub struct SpanTimer {
    stage: String,
    started: Instant,
}

impl SpanTimer {
    /// Starts timing `stage`.
    #[must_use]
    pub fn start(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            started: Instant::now(),
        }
    }

    /// Milliseconds since [`SpanTimer::start`].
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }

    /// Stops the timer and returns the elapsed milliseconds.
    #[must_use]
    pub fn finish(self) -> f64 {
        let duration_ms = self.elapsed_ms();
        tracing::trace!(stage = %self.stage, duration_ms, "Stage timed");
        duration_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measures_elapsed_time() {
        let timer = SpanTimer::start("publisher");
        std::thread::sleep(std::time::Duration::from_millis(5));

        assert!(timer.elapsed_ms() >= 5.0);
        assert!(timer.finish() >= 5.0);
    }
}
