//! Retry classification shared by every error kind.

/// Trait for errors that support retry logic.
///
/// Transient driver and network failures return `true` from
/// [`is_retryable`](RetryableError::is_retryable). Errors that no amount of
/// retrying can change (rejected credentials, bad configuration) return
/// `true` from [`is_fatal`](RetryableError::is_fatal) instead.
///
/// # Examples
///
/// ```
/// use courier_error::{FetchError, FetchErrorKind, RetryableError};
///
/// let err = FetchError::new(FetchErrorKind::Unreachable("timed out".into()));
/// assert!(err.is_retryable());
/// assert!(!err.is_fatal());
/// ```
pub trait RetryableError {
    /// Returns true if this error should trigger another attempt in the same cycle.
    fn is_retryable(&self) -> bool;

    /// Returns true if this error must halt the scheduler.
    fn is_fatal(&self) -> bool {
        false
    }
}
