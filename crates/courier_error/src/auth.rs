//! Authentication error types.

use crate::{DriverError, RetryableError};

/// Authentication failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum AuthErrorKind {
    /// The platform explicitly rejected the credentials.
    #[display("Login rejected: {}", _0)]
    InvalidCredentials(String),
    /// Expected login page elements were missing or the success signal never appeared.
    #[display("Login page structure changed: {}", _0)]
    PageStructureChanged(String),
    /// The automation driver could not be reached.
    #[display("Automation driver unavailable: {}", _0)]
    DriverUnavailable(String),
}

impl AuthErrorKind {
    /// Check if this error type should be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::PageStructureChanged(_) | Self::DriverUnavailable(_)
        )
    }
}

/// Authentication error with source location tracking.
///
/// # Examples
///
/// ```
/// use courier_error::{AuthError, AuthErrorKind, RetryableError};
///
/// let err = AuthError::new(AuthErrorKind::InvalidCredentials("bad password".into()));
/// assert!(err.is_fatal());
/// assert!(!err.is_retryable());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Auth Error: {} at line {} in {}", kind, line, file)]
pub struct AuthError {
    /// The kind of error that occurred
    pub kind: AuthErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl AuthError {
    /// Create a new AuthError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: AuthErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

impl RetryableError for AuthError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    fn is_fatal(&self) -> bool {
        matches!(self.kind, AuthErrorKind::InvalidCredentials(_))
    }
}

/// Element lookups become page-structure failures; everything else means the
/// driver itself is unhealthy.
impl From<DriverError> for AuthError {
    #[track_caller]
    fn from(e: DriverError) -> Self {
        if e.kind.is_transport() {
            Self::new(AuthErrorKind::DriverUnavailable(e.kind.to_string()))
        } else {
            Self::new(AuthErrorKind::PageStructureChanged(e.kind.to_string()))
        }
    }
}
