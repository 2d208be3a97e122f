//! Content fetch error types.

use crate::RetryableError;

/// Content retrieval failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum FetchErrorKind {
    /// Empty or malformed payload; skip this cycle.
    #[display("Invalid payload: {}", _0)]
    InvalidPayload(String),
    /// Network failure or timeout reaching the generation endpoint.
    #[display("Generation endpoint unreachable: {}", _0)]
    Unreachable(String),
}

/// Fetch error with source location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Fetch Error: {} at line {} in {}", kind, line, file)]
pub struct FetchError {
    /// The kind of error that occurred
    pub kind: FetchErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl FetchError {
    /// Create a new FetchError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: FetchErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

impl RetryableError for FetchError {
    fn is_retryable(&self) -> bool {
        matches!(self.kind, FetchErrorKind::Unreachable(_))
    }
}
