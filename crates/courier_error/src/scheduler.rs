//! Scheduler error types.

use crate::RetryableError;

/// Conditions that halt the scheduler on their own.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum SchedulerErrorKind {
    /// Too many consecutive cycles failed.
    #[display("Circuit breaker open after {} consecutive failed cycles", _0)]
    CircuitBreakerOpen(u32),
    /// The scheduler was assembled without a required component.
    #[display("Scheduler misconfigured: {}", _0)]
    Misconfigured(String),
}

/// Scheduler error with source location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Scheduler Error: {} at line {} in {}", kind, line, file)]
pub struct SchedulerError {
    /// The kind of error that occurred
    pub kind: SchedulerErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl SchedulerError {
    /// Create a new SchedulerError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: SchedulerErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

impl RetryableError for SchedulerError {
    fn is_retryable(&self) -> bool {
        false
    }

    fn is_fatal(&self) -> bool {
        true
    }
}
