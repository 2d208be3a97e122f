//! Publish error types.

use crate::{DriverError, RetryableError};

/// Publishing failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum PublishErrorKind {
    /// Submission happened but no confirmation signal was observed.
    #[display("Submission not confirmed: {}", _0)]
    UnconfirmedSubmission(String),
    /// The platform redirected back to login while publishing.
    #[display("Session expired during publish: {}", _0)]
    SessionExpired(String),
    /// The posting surface was missing an expected element.
    #[display("Posting page structure changed: {}", _0)]
    PageStructureChanged(String),
    /// The automation driver could not be reached.
    #[display("Automation driver unavailable: {}", _0)]
    DriverUnavailable(String),
}

/// Publish error with source location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Publish Error: {} at line {} in {}", kind, line, file)]
pub struct PublishError {
    /// The kind of error that occurred
    pub kind: PublishErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl PublishError {
    /// Create a new PublishError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PublishErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Whether this error asks for a re-authentication before republishing.
    pub fn is_session_expired(&self) -> bool {
        matches!(self.kind, PublishErrorKind::SessionExpired(_))
    }
}

/// `SessionExpired` is handled by a dedicated re-auth path rather than the
/// generic retry loop.
impl RetryableError for PublishError {
    fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            PublishErrorKind::UnconfirmedSubmission(_)
                | PublishErrorKind::PageStructureChanged(_)
                | PublishErrorKind::DriverUnavailable(_)
        )
    }
}

impl From<DriverError> for PublishError {
    #[track_caller]
    fn from(e: DriverError) -> Self {
        if e.kind.is_transport() {
            Self::new(PublishErrorKind::DriverUnavailable(e.kind.to_string()))
        } else {
            Self::new(PublishErrorKind::PageStructureChanged(e.kind.to_string()))
        }
    }
}
