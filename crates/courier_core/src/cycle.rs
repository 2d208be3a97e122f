//! Per-cycle outcome records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CycleOutcome {
    /// Content was posted and confirmed.
    #[display("SUCCESS")]
    Success,
    /// Nothing was posted, by design (duplicate or unusable payload).
    #[display("SKIPPED")]
    Skipped,
    /// The cycle gave up after exhausting its retries.
    #[display("FAILED")]
    Failed,
}

/// Outcome of one scheduler tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct CycleResult {
    outcome: CycleOutcome,
    reason: String,
    timestamp: DateTime<Utc>,
}

impl CycleResult {
    /// Build a result stamped with the current time.
    pub fn new(outcome: CycleOutcome, reason: impl Into<String>) -> Self {
        Self {
            outcome,
            reason: reason.into(),
            timestamp: Utc::now(),
        }
    }

    /// Content posted.
    pub fn success(reason: impl Into<String>) -> Self {
        Self::new(CycleOutcome::Success, reason)
    }

    /// Nothing posted on purpose.
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::new(CycleOutcome::Skipped, reason)
    }

    /// Gave up.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::new(CycleOutcome::Failed, reason)
    }
}
