//! Configuration error types.

use crate::RetryableError;

/// Configuration error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ConfigErrorKind {
    /// A required environment variable is not set.
    #[display("Missing required environment variable: {}", _0)]
    MissingVariable(String),
    /// A required environment variable is set but blank.
    #[display("Environment variable {} is empty", _0)]
    EmptyVariable(String),
    /// A value could not be parsed or violates an invariant.
    #[display("Invalid value for {}: {}", name, reason)]
    InvalidValue {
        /// Setting name
        name: String,
        /// Why the value was rejected
        reason: String,
    },
    /// Selector override file could not be read or parsed.
    #[display("Selector file error: {}", _0)]
    SelectorFile(String),
}

/// Configuration error with source location.
///
/// # Examples
///
/// ```
/// use courier_error::{ConfigError, ConfigErrorKind};
///
/// let err = ConfigError::new(ConfigErrorKind::MissingVariable("EMAIL".into()));
/// assert!(err.to_string().contains("EMAIL"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", kind, line, file)]
pub struct ConfigError {
    /// The kind of error that occurred
    pub kind: ConfigErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new ConfigError at the current location.
    #[track_caller]
    pub fn new(kind: ConfigErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

impl RetryableError for ConfigError {
    fn is_retryable(&self) -> bool {
        false
    }

    fn is_fatal(&self) -> bool {
        true
    }
}
