//! Immutable agent configuration loaded once at startup.

use courier_error::{ConfigError, ConfigErrorKind};
use tracing::debug;

/// Environment variable names read by [`Configuration::from_lookup`].
pub mod env_keys {
    /// URL of the platform login page.
    pub const LOGIN_URL: &str = "LOGIN_URL";
    /// Account email.
    pub const EMAIL: &str = "EMAIL";
    /// Account password.
    pub const PASSWORD: &str = "PASSWORD";
    /// Generation service endpoint.
    pub const GENERATION_ENDPOINT: &str = "GENERATION_ENDPOINT";
    /// Page where new posts are composed.
    pub const PLATFORM_POST_URL: &str = "PLATFORM_POST_URL";
    /// Posting interval in whole minutes.
    pub const POSTING_INTERVAL: &str = "POSTING_INTERVAL";

    /// Every required key, in reporting order.
    pub const REQUIRED: [&str; 6] = [
        GENERATION_ENDPOINT,
        PLATFORM_POST_URL,
        POSTING_INTERVAL,
        LOGIN_URL,
        EMAIL,
        PASSWORD,
    ];
}

/// Longest accepted posting interval: one year.
pub const MAX_INTERVAL_MINUTES: u64 = 365 * 24 * 60;

/// A credential that never appears in logs.
#[derive(Clone, PartialEq, Eq, derive_more::From)]
pub struct Secret(String);

impl Secret {
    /// Wrap a secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the underlying value.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// True if the secret is blank.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl std::fmt::Display for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("***")
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Settings that identify the account, the endpoints and the cadence.
///
/// Every field is non-empty and `interval_minutes` lies in
/// `1..=MAX_INTERVAL_MINUTES`; the builder rejects anything else.
///
/// # Examples
///
/// ```
/// use courier_core::Configuration;
///
/// let config = Configuration::builder()
///     .login_url("https://forum.example/login")
///     .email("bot@example.com")
///     .password("hunter2")
///     .generation_endpoint("https://gen.example/next")
///     .post_url("https://forum.example/latest")
///     .interval_minutes(60u64)
///     .build()
///     .expect("valid configuration");
///
/// assert_eq!(*config.interval_minutes(), 60);
/// assert_eq!(format!("{}", config.password()), "***");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters, derive_builder::Builder)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct Configuration {
    /// URL of the platform login page.
    login_url: String,
    /// Account email.
    email: String,
    /// Account password.
    password: Secret,
    /// Generation service endpoint.
    generation_endpoint: String,
    /// Page where new posts are composed.
    post_url: String,
    /// Minutes between cycle starts.
    interval_minutes: u64,
}

impl ConfigurationBuilder {
    fn validate(&self) -> Result<(), String> {
        let text_fields = [
            ("login_url", self.login_url.as_deref()),
            ("email", self.email.as_deref()),
            ("generation_endpoint", self.generation_endpoint.as_deref()),
            ("post_url", self.post_url.as_deref()),
        ];
        for (name, value) in text_fields {
            if value.is_some_and(|v| v.trim().is_empty()) {
                return Err(format!("{} must not be empty", name));
            }
        }
        if self.password.as_ref().is_some_and(Secret::is_empty) {
            return Err("password must not be empty".to_string());
        }
        if self.interval_minutes == Some(0) {
            return Err("interval_minutes must be greater than zero".to_string());
        }
        if self.interval_minutes.is_some_and(|m| m > MAX_INTERVAL_MINUTES) {
            return Err(format!(
                "interval_minutes must not exceed {}",
                MAX_INTERVAL_MINUTES
            ));
        }
        Ok(())
    }
}

impl Configuration {
    /// Creates a new configuration builder.
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::default()
    }

    /// Posting interval as a [`std::time::Duration`].
    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.interval_minutes.saturating_mul(60))
    }

    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key/value source.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - A required key is missing or blank
    /// - `POSTING_INTERVAL` is not a positive integer no larger than
    ///   [`MAX_INTERVAL_MINUTES`]
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = |key: &str| -> Result<String, ConfigError> {
            match lookup(key) {
                None => Err(ConfigError::new(ConfigErrorKind::MissingVariable(
                    key.to_string(),
                ))),
                Some(v) if v.trim().is_empty() => Err(ConfigError::new(
                    ConfigErrorKind::EmptyVariable(key.to_string()),
                )),
                Some(v) => Ok(v),
            }
        };
        let required = |key: &str| raw(key).map(|v| v.trim().to_string());

        // Report every missing key at once rather than one per restart.
        let missing: Vec<&str> = env_keys::REQUIRED
            .iter()
            .copied()
            .filter(|key| lookup(key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::new(ConfigErrorKind::MissingVariable(
                missing.join(", "),
            )));
        }

        let interval_raw = required(env_keys::POSTING_INTERVAL)?;
        let interval_minutes = interval_raw.parse::<u64>().map_err(|e| {
            ConfigError::new(ConfigErrorKind::InvalidValue {
                name: env_keys::POSTING_INTERVAL.to_string(),
                reason: format!("'{}' is not a whole number of minutes: {}", interval_raw, e),
            })
        })?;
        if interval_minutes > MAX_INTERVAL_MINUTES {
            return Err(ConfigError::new(ConfigErrorKind::InvalidValue {
                name: env_keys::POSTING_INTERVAL.to_string(),
                reason: format!(
                    "{} minutes exceeds the maximum of {}",
                    interval_minutes, MAX_INTERVAL_MINUTES
                ),
            }));
        }

        let config = Self::builder()
            .login_url(required(env_keys::LOGIN_URL)?)
            .email(required(env_keys::EMAIL)?)
            // Passwords are typed exactly as configured.
            .password(Secret::new(raw(env_keys::PASSWORD)?))
            .generation_endpoint(required(env_keys::GENERATION_ENDPOINT)?)
            .post_url(required(env_keys::PLATFORM_POST_URL)?)
            .interval_minutes(interval_minutes)
            .build()
            .map_err(|e| {
                ConfigError::new(ConfigErrorKind::InvalidValue {
                    name: "configuration".to_string(),
                    reason: e.to_string(),
                })
            })?;

        debug!(
            login_url = %config.login_url,
            post_url = %config.post_url,
            generation_endpoint = %config.generation_endpoint,
            interval_minutes = config.interval_minutes,
            "Configuration loaded"
        );
        Ok(config)
    }
}
