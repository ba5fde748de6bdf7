//! Time source seam used by header construction and decode validation.

use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Source of the current wall-clock time.
///
/// Implementations must be thread-safe (Send + Sync).
pub trait Clock: Send + Sync + 'static {
    /// Current time in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(
    /// Instant reported by [`Clock::now`].
    pub DateTime<Utc>,
);

impl Clock for FixedClock {
    #[inline]
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Implementation of Clock for Arc<T> to allow shared ownership.
impl<T: Clock> Clock for Arc<T> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}
