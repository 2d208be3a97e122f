//! Authentication state owned by the session manager.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where the session stands with the platform.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Never logged in, or the last login failed.
    #[default]
    #[display("unauthenticated")]
    Unauthenticated,
    /// Logged in.
    #[display("authenticated")]
    Authenticated,
    /// The platform signalled that a previous login is no longer valid.
    #[display("expired")]
    Expired,
}

/// Session record.
///
/// Transitions happen only through [`mark_authenticated`](Session::mark_authenticated),
/// [`invalidate`](Session::invalidate) and [`expire`](Session::expire).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct Session {
    status: SessionStatus,
    last_authenticated_at: Option<DateTime<Utc>>,
}

impl Session {
    /// A fresh, unauthenticated session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Authenticated and younger than `window` as of `now`.
    pub fn is_fresh(&self, now: DateTime<Utc>, window: Duration) -> bool {
        if self.status != SessionStatus::Authenticated {
            return false;
        }
        let Some(at) = self.last_authenticated_at else {
            return false;
        };
        match chrono::Duration::from_std(window) {
            Ok(window) => now.signed_duration_since(at) < window,
            // Window too large to represent: treat as never stale.
            Err(_) => true,
        }
    }

    /// Record a successful login at `now`.
    pub fn mark_authenticated(&mut self, now: DateTime<Utc>) {
        self.status = SessionStatus::Authenticated;
        self.last_authenticated_at = Some(now);
    }

    /// Record a failed login.
    pub fn invalidate(&mut self) {
        self.status = SessionStatus::Unauthenticated;
    }

    /// Record that the platform dropped the session.
    pub fn expire(&mut self) {
        self.status = SessionStatus::Expired;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_not_fresh() {
        let session = Session::new();
        assert_eq!(*session.status(), SessionStatus::Unauthenticated);
        assert!(!session.is_fresh(Utc::now(), Duration::from_secs(60)));
    }

    #[test]
    fn test_freshness_window() {
        let mut session = Session::new();
        let at = Utc::now();
        session.mark_authenticated(at);

        assert!(session.is_fresh(at + chrono::Duration::seconds(59), Duration::from_secs(60)));
        assert!(!session.is_fresh(at + chrono::Duration::seconds(60), Duration::from_secs(60)));
    }

    #[test]
    fn test_expired_session_is_not_fresh() {
        let mut session = Session::new();
        let at = Utc::now();
        session.mark_authenticated(at);
        session.expire();

        assert_eq!(*session.status(), SessionStatus::Expired);
        assert!(!session.is_fresh(at, Duration::from_secs(3600)));
        assert_eq!(*session.last_authenticated_at(), Some(at));
    }
}
