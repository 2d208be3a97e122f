//! Error types for the Courier relay agent.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! Each kind reports whether it is worth retrying within the current cycle
//! ([`RetryableError`]) and whether it should halt the agent entirely.
//!
//! # Examples
//!
//! ```
//! use courier_error::{AuthError, AuthErrorKind, CourierResult, RetryableError};
//!
//! fn login() -> CourierResult<()> {
//!     Err(AuthError::new(AuthErrorKind::DriverUnavailable("connection reset".into())))?
//! }
//!
//! let err = login().unwrap_err();
//! assert!(err.is_retryable());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod auth;
mod config;
mod driver;
mod error;
mod fetch;
mod publish;
mod retry;
mod scheduler;

pub use auth::{AuthError, AuthErrorKind};
pub use config::{ConfigError, ConfigErrorKind};
pub use driver::{DriverError, DriverErrorKind, DriverResult};
pub use error::{CourierError, CourierErrorKind, CourierResult};
pub use fetch::{FetchError, FetchErrorKind};
pub use publish::{PublishError, PublishErrorKind};
pub use retry::RetryableError;
pub use scheduler::{SchedulerError, SchedulerErrorKind};
