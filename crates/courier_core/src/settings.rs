//! Tunable agent settings with defaults.

use crate::PageSelectors;
use courier_error::{ConfigError, ConfigErrorKind};
use std::time::Duration;

// Environment overrides for AgentSettings.
const SESSION_FRESHNESS_MINUTES: &str = "SESSION_FRESHNESS_MINUTES";
const RETRY_MAX_ATTEMPTS: &str = "RETRY_MAX_ATTEMPTS";
const RETRY_INITIAL_BACKOFF_MS: &str = "RETRY_INITIAL_BACKOFF_MS";
const RETRY_MAX_BACKOFF_SECS: &str = "RETRY_MAX_BACKOFF_SECS";
const ELEMENT_TIMEOUT_SECS: &str = "ELEMENT_TIMEOUT_SECS";
const CONFIRMATION_TIMEOUT_SECS: &str = "CONFIRMATION_TIMEOUT_SECS";
const FETCH_TIMEOUT_SECS: &str = "FETCH_TIMEOUT_SECS";
const WEBDRIVER_URL: &str = "WEBDRIVER_URL";
const CIRCUIT_BREAKER_THRESHOLD: &str = "CIRCUIT_BREAKER_THRESHOLD";
const COURIER_SELECTORS: &str = "COURIER_SELECTORS";

/// Timeouts, retry policy and driver location.
///
/// # Examples
///
/// ```
/// use courier_core::AgentSettings;
/// use std::time::Duration;
///
/// let settings = AgentSettings::builder()
///     .max_attempts(5u32)
///     .element_timeout(Duration::from_secs(2))
///     .build()
///     .expect("valid settings");
///
/// assert_eq!(*settings.max_attempts(), 5);
/// assert_eq!(*settings.freshness_window(), Duration::from_secs(30 * 60));
/// ```
#[derive(Debug, Clone, derive_getters::Getters, derive_builder::Builder)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct AgentSettings {
    /// Maximum age of a login before it is redone.
    #[builder(default = "Duration::from_secs(30 * 60)")]
    freshness_window: Duration,

    /// Attempt ceiling for retryable steps within one cycle.
    #[builder(default = "3")]
    max_attempts: u32,

    /// First backoff delay between attempts.
    #[builder(default = "Duration::from_millis(2000)")]
    initial_backoff: Duration,

    /// Upper bound for any single backoff delay.
    #[builder(default = "Duration::from_secs(60)")]
    max_backoff: Duration,

    /// Bounded wait for page elements.
    #[builder(default = "Duration::from_secs(10)")]
    element_timeout: Duration,

    /// Bounded wait for the post-login and post-submit signals.
    #[builder(default = "Duration::from_secs(30)")]
    confirmation_timeout: Duration,

    /// Poll period used while waiting for page conditions.
    #[builder(default = "Duration::from_millis(250)")]
    poll_interval: Duration,

    /// Request timeout for the generation endpoint.
    #[builder(default = "Duration::from_secs(30)")]
    fetch_timeout: Duration,

    /// W3C WebDriver endpoint.
    #[builder(default = "\"http://localhost:9515\".to_string()")]
    webdriver_url: String,

    /// Consecutive failed cycles that halt the scheduler; `None` disables.
    #[builder(default)]
    circuit_breaker_threshold: Option<u32>,

    /// Page selectors.
    #[builder(default)]
    selectors: PageSelectors,
}

impl AgentSettingsBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.max_attempts == Some(0) {
            return Err("max_attempts must be at least 1".to_string());
        }
        if let Some(Some(0)) = self.circuit_breaker_threshold {
            return Err("circuit_breaker_threshold must be at least 1".to_string());
        }
        Ok(())
    }
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            freshness_window: Duration::from_secs(30 * 60),
            max_attempts: 3,
            initial_backoff: Duration::from_millis(2000),
            max_backoff: Duration::from_secs(60),
            element_timeout: Duration::from_secs(10),
            confirmation_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(250),
            fetch_timeout: Duration::from_secs(30),
            webdriver_url: "http://localhost:9515".to_string(),
            circuit_breaker_threshold: None,
            selectors: PageSelectors::default(),
        }
    }
}

impl AgentSettings {
    /// Creates a new settings builder.
    pub fn builder() -> AgentSettingsBuilder {
        AgentSettingsBuilder::default()
    }

    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key/value source; unset keys keep their default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let number = |key: &str| -> Result<Option<u64>, ConfigError> {
            match lookup(key) {
                None => Ok(None),
                Some(raw) if raw.trim().is_empty() => Ok(None),
                Some(raw) => raw.trim().parse::<u64>().map(Some).map_err(|e| {
                    ConfigError::new(ConfigErrorKind::InvalidValue {
                        name: key.to_string(),
                        reason: format!("'{}': {}", raw, e),
                    })
                }),
            }
        };

        let mut builder = Self::builder();
        if let Some(minutes) = number(SESSION_FRESHNESS_MINUTES)? {
            let secs = minutes.checked_mul(60).ok_or_else(|| {
                ConfigError::new(ConfigErrorKind::InvalidValue {
                    name: SESSION_FRESHNESS_MINUTES.to_string(),
                    reason: format!("{} minutes is out of range", minutes),
                })
            })?;
            builder.freshness_window(Duration::from_secs(secs));
        }
        if let Some(attempts) = number(RETRY_MAX_ATTEMPTS)? {
            let attempts = u32::try_from(attempts).map_err(|e| {
                ConfigError::new(ConfigErrorKind::InvalidValue {
                    name: RETRY_MAX_ATTEMPTS.to_string(),
                    reason: e.to_string(),
                })
            })?;
            builder.max_attempts(attempts);
        }
        if let Some(ms) = number(RETRY_INITIAL_BACKOFF_MS)? {
            builder.initial_backoff(Duration::from_millis(ms));
        }
        if let Some(secs) = number(RETRY_MAX_BACKOFF_SECS)? {
            builder.max_backoff(Duration::from_secs(secs));
        }
        if let Some(secs) = number(ELEMENT_TIMEOUT_SECS)? {
            builder.element_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = number(CONFIRMATION_TIMEOUT_SECS)? {
            builder.confirmation_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = number(FETCH_TIMEOUT_SECS)? {
            builder.fetch_timeout(Duration::from_secs(secs));
        }
        if let Some(threshold) = number(CIRCUIT_BREAKER_THRESHOLD)? {
            let threshold = u32::try_from(threshold).map_err(|e| {
                ConfigError::new(ConfigErrorKind::InvalidValue {
                    name: CIRCUIT_BREAKER_THRESHOLD.to_string(),
                    reason: e.to_string(),
                })
            })?;
            builder.circuit_breaker_threshold(Some(threshold));
        }
        if let Some(url) = lookup(WEBDRIVER_URL).filter(|u| !u.trim().is_empty()) {
            builder.webdriver_url(url.trim().to_string());
        }
        if let Some(path) = lookup(COURIER_SELECTORS).filter(|p| !p.trim().is_empty()) {
            builder.selectors(PageSelectors::from_file(path.trim())?);
        }

        builder.build().map_err(|e| {
            ConfigError::new(ConfigErrorKind::InvalidValue {
                name: "settings".to_string(),
                reason: e.to_string(),
            })
        })
    }
}
