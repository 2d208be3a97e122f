//! Process exit codes.

use courier_error::{CourierError, CourierErrorKind};

/// Clean shutdown.
pub const EXIT_OK: u8 = 0;
/// Unrecoverable runtime failure other than the cases below.
pub const EXIT_FAILURE: u8 = 1;
/// Configuration missing or invalid.
pub const EXIT_CONFIG: u8 = 2;
/// Credentials rejected by the platform.
pub const EXIT_AUTH: u8 = 3;

/// Exit code for an error that stopped the agent.
///
/// # Examples
///
/// ```
/// use courier_agent::{EXIT_AUTH, exit_status};
/// use courier_error::{AuthError, AuthErrorKind, CourierError};
///
/// let err: CourierError = AuthError::new(AuthErrorKind::InvalidCredentials("bad".into())).into();
/// assert_eq!(exit_status(&err), EXIT_AUTH);
/// ```
pub fn exit_status(error: &CourierError) -> u8 {
    match error.kind() {
        CourierErrorKind::Config(_) => EXIT_CONFIG,
        CourierErrorKind::Auth(_) => EXIT_AUTH,
        _ => EXIT_FAILURE,
    }
}
