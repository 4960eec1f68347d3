//! Injected dependencies for the order workflow.

use chrono::{DateTime, Utc};

/// Source of the current time.
///
/// Services take a `Clock` instead of calling `Utc::now()` directly so
/// that tests can pin timestamps.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
