//! Fixed-interval cycle loop.

use crate::{
    AgentContext, ContentSource, CycleStats, PublishReceipt, Publisher, RetryPolicy,
    SessionManager,
};
use courier_core::{ContentItem, CycleResult};
use courier_error::{
    CourierResult, FetchErrorKind, RetryableError, SchedulerError, SchedulerErrorKind,
};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info, instrument, warn};

/// Where the scheduler is in its loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, derive_more::Display)]
pub enum SchedulerState {
    /// Not running.
    #[default]
    #[display("idle")]
    Idle,
    /// Executing a cycle.
    #[display("running_cycle")]
    RunningCycle,
    /// Waiting for the next cycle start.
    #[display("sleeping")]
    Sleeping,
    /// Halted by an unrecoverable error.
    #[display("fatal")]
    Fatal,
}

/// Time left until the next cycle should start.
///
/// Cycles start `interval` apart, measured start to start. A cycle that ran
/// longer than the interval is followed immediately by the next one.
///
/// # Examples
///
/// ```
/// use courier_agent::next_delay;
/// use std::time::Duration;
/// use tokio::time::Instant;
///
/// let started = Instant::now();
/// let interval = Duration::from_secs(300);
///
/// assert_eq!(next_delay(started, started + Duration::from_secs(60), interval), Duration::from_secs(240));
/// assert_eq!(next_delay(started, started + Duration::from_secs(420), interval), Duration::ZERO);
/// ```
pub fn next_delay(started: Instant, now: Instant, interval: Duration) -> Duration {
    match started.checked_add(interval) {
        Some(deadline) => deadline.saturating_duration_since(now),
        // Deadline beyond the clock's range.
        None => interval.saturating_sub(now.saturating_duration_since(started)),
    }
}

/// Drives authenticate, fetch and publish once per interval.
///
/// Each cycle ends as SUCCESS, SKIPPED or FAILED. Only unrecoverable
/// conditions (rejected credentials, an open circuit breaker) stop the loop.
pub struct Scheduler {
    context: AgentContext,
    source: Arc<dyn ContentSource>,
    sessions: SessionManager,
    publisher: Publisher,
    retry: RetryPolicy,
    stats: CycleStats,
    state: Mutex<SchedulerState>,
}

impl Scheduler {
    /// Create a new scheduler with builder pattern.
    pub fn builder() -> SchedulerBuilder {
        SchedulerBuilder::default()
    }

    /// Current loop state.
    pub fn state(&self) -> SchedulerState {
        *self.state.lock()
    }

    /// Shared cycle counters.
    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    /// Session manager used for logins.
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Publisher used for posting.
    pub fn publisher(&self) -> &Publisher {
        &self.publisher
    }

    fn set_state(&self, state: SchedulerState) {
        *self.state.lock() = state;
    }

    /// Run a single cycle and return to idle.
    ///
    /// # Errors
    ///
    /// Returns error only for unrecoverable conditions.
    pub async fn run_once(&self) -> CourierResult<CycleResult> {
        let result = self.run_cycle().await?;
        self.set_state(SchedulerState::Idle);
        Ok(result)
    }

    /// Run cycles until `shutdown` resolves or an unrecoverable error occurs.
    ///
    /// Shutdown is observed between cycles; a cycle in progress always
    /// finishes first.
    ///
    /// # Errors
    ///
    /// Returns the unrecoverable error that halted the loop.
    #[instrument(skip_all, fields(interval_minutes = *self.context.config().interval_minutes()))]
    pub async fn run<S>(&self, shutdown: S) -> CourierResult<()>
    where
        S: Future<Output = ()>,
    {
        let interval = self.context.config().interval();
        tokio::pin!(shutdown);
        info!("Scheduler started");

        loop {
            let started = Instant::now();
            self.run_cycle().await?;

            let delay = next_delay(started, Instant::now(), interval);
            self.set_state(SchedulerState::Sleeping);
            info!(delay_secs = delay.as_secs(), "Sleeping until next cycle");

            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }

        self.set_state(SchedulerState::Idle);
        let stats = self.stats.snapshot();
        info!(
            succeeded = stats.succeeded,
            skipped = stats.skipped,
            failed = stats.failed,
            "Scheduler stopped"
        );
        Ok(())
    }

    /// Execute one authenticate, fetch, publish pass.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The platform rejects the credentials
    /// - The circuit breaker threshold is reached
    #[instrument(skip(self))]
    pub async fn run_cycle(&self) -> CourierResult<CycleResult> {
        self.set_state(SchedulerState::RunningCycle);

        let result = match self.cycle_steps().await {
            Ok(result) => result,
            Err(error) => {
                self.set_state(SchedulerState::Fatal);
                error!(error = %error, "Unrecoverable error, halting");
                return Err(error);
            }
        };

        let streak = self.stats.record(&result);
        let stats = self.stats.snapshot();
        info!(
            outcome = %result.outcome(),
            reason = %result.reason(),
            cycles = stats.total(),
            succeeded = stats.succeeded,
            skipped = stats.skipped,
            failed = stats.failed,
            consecutive_failures = streak,
            "Cycle finished"
        );

        if let Some(threshold) = *self.context.settings().circuit_breaker_threshold() {
            if streak >= threshold {
                self.set_state(SchedulerState::Fatal);
                error!(streak, threshold, "Circuit breaker open, halting");
                return Err(
                    SchedulerError::new(SchedulerErrorKind::CircuitBreakerOpen(streak)).into(),
                );
            }
        }

        Ok(result)
    }

    async fn cycle_steps(&self) -> CourierResult<CycleResult> {
        if let Err(error) = self
            .retry
            .run("authenticate", || self.sessions.ensure_authenticated())
            .await
        {
            if error.is_fatal() {
                return Err(error.into());
            }
            return Ok(CycleResult::failed(format!("authentication failed: {}", error.kind)));
        }

        let item = match self.retry.run("fetch", || self.source.fetch_content()).await {
            Ok(item) => item,
            Err(error) => {
                return Ok(match error.kind {
                    FetchErrorKind::InvalidPayload(reason) => {
                        CycleResult::skipped(format!("unusable payload: {}", reason))
                    }
                    FetchErrorKind::Unreachable(reason) => {
                        CycleResult::failed(format!("content fetch failed: {}", reason))
                    }
                });
            }
        };

        self.publish(&item).await
    }

    async fn publish(&self, item: &ContentItem) -> CourierResult<CycleResult> {
        let error = match self
            .retry
            .run("publish", || self.publisher.publish(item))
            .await
        {
            Ok(receipt) => return Ok(receipt_result(receipt)),
            Err(error) if error.is_session_expired() => error,
            Err(error) => {
                return Ok(CycleResult::failed(format!("publish failed: {}", error.kind)));
            }
        };

        // One re-authentication and one republish, outside the retry loop.
        warn!(error = %error.kind, "Session expired while publishing, re-authenticating");
        self.sessions.invalidate_expired();
        if let Err(error) = self.sessions.ensure_authenticated().await {
            if error.is_fatal() {
                return Err(error.into());
            }
            return Ok(CycleResult::failed(format!("re-authentication failed: {}", error.kind)));
        }

        match self.publisher.publish(item).await {
            Ok(receipt) => Ok(receipt_result(receipt)),
            Err(error) => Ok(CycleResult::failed(format!(
                "publish after re-authentication failed: {}",
                error.kind
            ))),
        }
    }
}

fn receipt_result(receipt: PublishReceipt) -> CycleResult {
    match receipt {
        PublishReceipt::Published(reference) => {
            CycleResult::success(format!("posted {}", reference.short()))
        }
        PublishReceipt::Duplicate(reference) => {
            CycleResult::skipped(format!("duplicate of last post {}", reference.short()))
        }
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("context", &self.context)
            .field("retry", &self.retry)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Builder for creating Scheduler instances.
#[derive(Default)]
pub struct SchedulerBuilder {
    context: Option<AgentContext>,
    source: Option<Arc<dyn ContentSource>>,
}

impl SchedulerBuilder {
    /// Set the shared agent context.
    pub fn context(mut self, context: AgentContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Set the content source.
    pub fn source(mut self, source: Arc<dyn ContentSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Build the scheduler.
    ///
    /// # Errors
    ///
    /// Returns error if required fields are missing.
    pub fn build(self) -> Result<Scheduler, SchedulerError> {
        let context = self.context.ok_or_else(|| {
            SchedulerError::new(SchedulerErrorKind::Misconfigured(
                "agent context is required".to_string(),
            ))
        })?;
        let source = self.source.ok_or_else(|| {
            SchedulerError::new(SchedulerErrorKind::Misconfigured(
                "content source is required".to_string(),
            ))
        })?;

        Ok(Scheduler {
            retry: RetryPolicy::from_settings(context.settings()),
            sessions: SessionManager::new(context.clone()),
            publisher: Publisher::new(context.clone()),
            context,
            source,
            stats: CycleStats::new(),
            state: Mutex::new(SchedulerState::Idle),
        })
    }
}
