//! Bounded retry with exponential backoff.

use courier_core::AgentSettings;
use courier_error::RetryableError;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio_retry2::strategy::{ExponentialBackoff, jitter};

/// Attempt ceiling and backoff shape for one retryable step.
///
/// `max_attempts` counts every attempt, the first included. Delays double
/// from `initial_backoff`, are capped at `max_backoff`, and are jittered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_getters::Getters)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl RetryPolicy {
    /// Build a policy; an attempt ceiling of zero is raised to one.
    pub fn new(max_attempts: u32, initial_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
            max_backoff,
        }
    }

    /// Policy described by the agent settings.
    pub fn from_settings(settings: &AgentSettings) -> Self {
        Self::new(
            *settings.max_attempts(),
            *settings.initial_backoff(),
            *settings.max_backoff(),
        )
    }

    /// Delays slept between attempts; one fewer than the attempt ceiling.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + use<> {
        // from_millis(2) doubles per step; the factor scales the first delay
        // to `initial_backoff`.
        let factor = (self.initial_backoff.as_millis() as u64 / 2).max(1);
        ExponentialBackoff::from_millis(2)
            .factor(factor)
            .max_delay(self.max_backoff)
            .map(jitter)
            .take(self.max_attempts.saturating_sub(1) as usize)
    }

    /// Run `operation` until it succeeds, fails permanently, or the attempt
    /// ceiling is reached.
    ///
    /// Non-retryable errors are returned immediately. After the last attempt
    /// the most recent error is returned.
    pub async fn run<T, E, F, Fut>(&self, step: &str, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: RetryableError + Display,
    {
        let mut delays = self.delays();
        let mut attempt = 1u32;

        loop {
            let error = match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::info!(step, attempt, "Step succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(error) => error,
            };

            if !error.is_retryable() {
                tracing::warn!(step, attempt, error = %error, "Permanent error, not retrying");
                return Err(error);
            }

            let Some(delay) = delays.next() else {
                tracing::warn!(
                    step,
                    attempt,
                    max_attempts = self.max_attempts,
                    error = %error,
                    "Retries exhausted"
                );
                return Err(error);
            };

            tracing::warn!(
                step,
                attempt,
                max_attempts = self.max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Transient error, will retry"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
