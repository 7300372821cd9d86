//! Injectable wall clock for ledger timestamps.

use chrono::{DateTime, Utc};

/// Source of the current instant.
///
/// The ledger stamps `date_added` / `date_updated` through this trait so tests
/// can assert exact values.
pub trait Clock: Send + Sync {
    /// Current UTC instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
