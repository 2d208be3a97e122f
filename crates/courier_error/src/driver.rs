//! Automation driver error types.

use crate::RetryableError;

/// Failures reported by an automation driver call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum DriverErrorKind {
    /// The driver endpoint could not be reached or dropped the connection.
    #[display("Driver transport failure: {}", _0)]
    Transport(String),
    /// A driver call did not complete within its timeout.
    #[display("Driver call timed out: {}", _0)]
    Timeout(String),
    /// No element matched the selector.
    #[display("Element not found: {}", _0)]
    ElementNotFound(String),
    /// A previously located element is no longer attached to the page.
    #[display("Stale element: {}", _0)]
    StaleElement(String),
    /// The driver answered with an unexpected protocol response.
    #[display("Driver protocol error: {}", _0)]
    Protocol(String),
}

impl DriverErrorKind {
    /// Transport-class failures mean the browser session itself is unhealthy.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout(_) | Self::Protocol(_))
    }
}

/// Driver error with source location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Driver Error: {} at line {} in {}", kind, line, file)]
pub struct DriverError {
    /// The kind of error that occurred
    pub kind: DriverErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl DriverError {
    /// Create a new DriverError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: DriverErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

impl RetryableError for DriverError {
    fn is_retryable(&self) -> bool {
        true
    }
}

/// Result type for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;
