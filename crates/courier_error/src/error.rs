//! Top-level error wrapper types.

use crate::{
    AuthError, ConfigError, DriverError, FetchError, PublishError, RetryableError, SchedulerError,
};

/// Every error condition the agent can surface.
///
/// # Examples
///
/// ```
/// use courier_error::{CourierError, FetchError, FetchErrorKind};
///
/// let fetch_err = FetchError::new(FetchErrorKind::InvalidPayload("empty".into()));
/// let err: CourierError = fetch_err.into();
/// assert!(format!("{}", err).contains("Fetch Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum CourierErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Automation driver error
    #[from(DriverError)]
    Driver(DriverError),
    /// Authentication error
    #[from(AuthError)]
    Auth(AuthError),
    /// Content fetch error
    #[from(FetchError)]
    Fetch(FetchError),
    /// Publish error
    #[from(PublishError)]
    Publish(PublishError),
    /// Scheduler error
    #[from(SchedulerError)]
    Scheduler(SchedulerError),
}

/// Courier error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Courier Error: {}", _0)]
pub struct CourierError(Box<CourierErrorKind>);

impl CourierError {
    /// Create a new error from a kind.
    pub fn new(kind: CourierErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &CourierErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to CourierErrorKind
impl<T> From<T> for CourierError
where
    T: Into<CourierErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

impl RetryableError for CourierError {
    fn is_retryable(&self) -> bool {
        match self.kind() {
            CourierErrorKind::Config(e) => e.is_retryable(),
            CourierErrorKind::Driver(e) => e.is_retryable(),
            CourierErrorKind::Auth(e) => e.is_retryable(),
            CourierErrorKind::Fetch(e) => e.is_retryable(),
            CourierErrorKind::Publish(e) => e.is_retryable(),
            CourierErrorKind::Scheduler(e) => e.is_retryable(),
        }
    }

    fn is_fatal(&self) -> bool {
        match self.kind() {
            CourierErrorKind::Config(e) => e.is_fatal(),
            CourierErrorKind::Driver(e) => e.is_fatal(),
            CourierErrorKind::Auth(e) => e.is_fatal(),
            CourierErrorKind::Fetch(e) => e.is_fatal(),
            CourierErrorKind::Publish(e) => e.is_fatal(),
            CourierErrorKind::Scheduler(e) => e.is_fatal(),
        }
    }
}

/// Result type for Courier operations.
pub type CourierResult<T> = std::result::Result<T, CourierError>;
