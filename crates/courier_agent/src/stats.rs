//! Running cycle counters.

use chrono::{DateTime, Utc};
use courier_core::{CycleOutcome, CycleResult};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// Counters over every cycle the scheduler has run.
///
/// Clones share the same counters.
#[derive(Debug, Clone, Default)]
pub struct CycleStats {
    inner: Arc<CycleStatsInner>,
}

#[derive(Debug, Default)]
struct CycleStatsInner {
    succeeded: AtomicU64,
    skipped: AtomicU64,
    failed: AtomicU64,
    consecutive_failures: AtomicU32,
    last_success: parking_lot::Mutex<Option<DateTime<Utc>>>,
}

impl CycleStats {
    /// Fresh counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a finished cycle; returns the consecutive failure streak.
    pub fn record(&self, result: &CycleResult) -> u32 {
        match result.outcome() {
            CycleOutcome::Success => {
                self.inner.succeeded.fetch_add(1, Ordering::Relaxed);
                *self.inner.last_success.lock() = Some(*result.timestamp());
                self.inner.consecutive_failures.store(0, Ordering::Relaxed);
                0
            }
            CycleOutcome::Skipped => {
                self.inner.skipped.fetch_add(1, Ordering::Relaxed);
                self.inner.consecutive_failures.store(0, Ordering::Relaxed);
                0
            }
            CycleOutcome::Failed => {
                self.inner.failed.fetch_add(1, Ordering::Relaxed);
                self.inner.consecutive_failures.fetch_add(1, Ordering::Relaxed) + 1
            }
        }
    }

    /// Current consecutive failure streak.
    pub fn consecutive_failures(&self) -> u32 {
        self.inner.consecutive_failures.load(Ordering::Relaxed)
    }

    /// Point-in-time copy of the counters.
    pub fn snapshot(&self) -> CycleStatsSnapshot {
        CycleStatsSnapshot {
            succeeded: self.inner.succeeded.load(Ordering::Relaxed),
            skipped: self.inner.skipped.load(Ordering::Relaxed),
            failed: self.inner.failed.load(Ordering::Relaxed),
            consecutive_failures: self.consecutive_failures(),
            last_success: *self.inner.last_success.lock(),
        }
    }
}

/// Serializable view of [`CycleStats`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleStatsSnapshot {
    /// Cycles that posted content.
    pub succeeded: u64,
    /// Cycles that posted nothing on purpose.
    pub skipped: u64,
    /// Cycles that gave up.
    pub failed: u64,
    /// Failures since the last non-failed cycle.
    pub consecutive_failures: u32,
    /// Timestamp of the last successful cycle.
    pub last_success: Option<DateTime<Utc>>,
}

impl CycleStatsSnapshot {
    /// Total cycles run.
    pub fn total(&self) -> u64 {
        self.succeeded + self.skipped + self.failed
    }
}
