//! Login handling and session freshness.

use crate::AgentContext;
use chrono::Utc;
use courier_core::{Selector, Session, SessionStatus};
use courier_driver::{ElementHandle, WaitCondition};
use courier_error::{AuthError, AuthErrorKind};
use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};

/// Owns the session record and performs logins through the driver.
///
/// A fresh session is reused without touching the driver. Anything else
/// triggers a full login: load the login page, fill the credentials, submit,
/// then wait for either the authenticated marker or the login error element.
#[derive(Debug)]
pub struct SessionManager {
    context: AgentContext,
    session: Mutex<Session>,
}

impl SessionManager {
    /// Start with an unauthenticated session.
    pub fn new(context: AgentContext) -> Self {
        Self {
            context,
            session: Mutex::new(Session::new()),
        }
    }

    /// Snapshot of the session record.
    pub fn session(&self) -> Session {
        self.session.lock().clone()
    }

    /// Current session status.
    pub fn status(&self) -> SessionStatus {
        *self.session.lock().status()
    }

    /// Mark the session as dropped by the platform so the next call logs in.
    pub fn invalidate_expired(&self) {
        warn!("Platform dropped the session");
        self.session.lock().expire();
    }

    /// Make sure the browser is logged in.
    ///
    /// # Errors
    ///
    /// - `InvalidCredentials` when the platform shows its login error
    /// - `PageStructureChanged` when a form element or the outcome signal is missing
    /// - `DriverUnavailable` when the driver cannot be reached
    #[instrument(skip(self), fields(driver = self.context.driver().driver_name()))]
    pub async fn ensure_authenticated(&self) -> Result<(), AuthError> {
        let window = *self.context.settings().freshness_window();
        if self.session.lock().is_fresh(Utc::now(), window) {
            debug!("Session still fresh, skipping login");
            return Ok(());
        }

        match self.log_in().await {
            Ok(()) => {
                self.session.lock().mark_authenticated(Utc::now());
                info!("Logged in");
                Ok(())
            }
            Err(error) => {
                self.session.lock().invalidate();
                warn!(error = %error, "Login failed");
                Err(error)
            }
        }
    }

    async fn log_in(&self) -> Result<(), AuthError> {
        let config = self.context.config();
        let settings = self.context.settings();
        let selectors = settings.selectors();
        let driver = self.context.driver();

        driver.navigate(config.login_url()).await?;

        let email = self.require(selectors.login_email(), "email field").await?;
        let password = self.require(selectors.login_password(), "password field").await?;
        let submit = self.require(selectors.login_submit(), "login button").await?;

        driver.set_value(&email, config.email()).await?;
        driver.set_value(&password, config.password().expose()).await?;
        driver.click(&submit).await?;

        let marker = WaitCondition::ElementPresent(selectors.authenticated_marker().clone());
        let rejected = WaitCondition::ElementPresent(selectors.login_error().clone());
        let settled = driver
            .wait_for(
                &WaitCondition::AnyOf(vec![marker, rejected]),
                *settings.confirmation_timeout(),
            )
            .await?;

        if !settled {
            return Err(AuthError::new(AuthErrorKind::PageStructureChanged(
                "no login outcome observed before timeout".to_string(),
            )));
        }

        // The marker wins if both are somehow visible.
        if driver.find_element(selectors.authenticated_marker()).await?.is_some() {
            return Ok(());
        }
        if driver.find_element(selectors.login_error()).await?.is_some() {
            return Err(AuthError::new(AuthErrorKind::InvalidCredentials(
                "platform rejected the credentials".to_string(),
            )));
        }
        Err(AuthError::new(AuthErrorKind::PageStructureChanged(
            "login outcome disappeared".to_string(),
        )))
    }

    async fn require(&self, selector: &Selector, what: &str) -> Result<ElementHandle, AuthError> {
        let timeout = *self.context.settings().element_timeout();
        self.context
            .driver()
            .wait_for_element(selector, timeout)
            .await?
            .ok_or_else(|| {
                AuthError::new(AuthErrorKind::PageStructureChanged(format!(
                    "{} not found ({})",
                    what, selector
                )))
            })
    }
}
