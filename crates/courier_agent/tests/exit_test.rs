//! Exit code mapping.

use courier_agent::{EXIT_AUTH, EXIT_CONFIG, EXIT_FAILURE, exit_status};
use courier_core::Configuration;
use courier_error::{
    AuthError, AuthErrorKind, CourierError, DriverError, DriverErrorKind, FetchError,
    FetchErrorKind, SchedulerError, SchedulerErrorKind,
};
use std::collections::HashMap;

#[test]
fn test_missing_email_maps_to_config_exit() {
    let env: HashMap<&str, &str> = [
        ("LOGIN_URL", "https://forum.example/login"),
        ("PASSWORD", "hunter2"),
        ("GENERATION_ENDPOINT", "https://gen.example/next"),
        ("PLATFORM_POST_URL", "https://forum.example/latest"),
        ("POSTING_INTERVAL", "60"),
    ]
    .into_iter()
    .collect();

    let err: CourierError = Configuration::from_lookup(|key| env.get(key).map(|v| v.to_string()))
        .unwrap_err()
        .into();

    assert_eq!(exit_status(&err), EXIT_CONFIG);
    assert!(err.to_string().contains("EMAIL"));
}

#[test]
fn test_rejected_credentials_map_to_auth_exit() {
    let err: CourierError =
        AuthError::new(AuthErrorKind::InvalidCredentials("rejected".into())).into();
    assert_eq!(exit_status(&err), EXIT_AUTH);
}

#[test]
fn test_other_errors_map_to_failure_exit() {
    let errors: Vec<CourierError> = vec![
        DriverError::new(DriverErrorKind::Transport("refused".into())).into(),
        FetchError::new(FetchErrorKind::Unreachable("down".into())).into(),
        SchedulerError::new(SchedulerErrorKind::CircuitBreakerOpen(5)).into(),
    ];
    for err in &errors {
        assert_eq!(exit_status(err), EXIT_FAILURE, "{}", err);
    }
}
