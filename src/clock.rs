//! Virtual wall clock.
//!
//! All controller timing is expressed against this clock. It only moves when
//! the controller is told to advance, so tests and simulations are fully
//! deterministic.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Monotonic virtual clock anchored at a real calendar instant.
#[derive(Clone, Debug)]
pub struct VirtualClock {
    start: DateTime<Utc>,
    now: DateTime<Utc>,
}

impl VirtualClock {
    /// Create a clock whose current time is `start`.
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self { start, now: start }
    }

    /// Current virtual time.
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Time elapsed since the clock started.
    pub fn elapsed(&self) -> Duration {
        since(self.start, self.now)
    }

    /// Move the clock forward to `instant`.
    ///
    /// Instants in the past are ignored; the clock never runs backwards.
    pub fn advance_to(&mut self, instant: DateTime<Utc>) {
        if instant > self.now {
            self.now = instant;
        }
    }

    /// The instant `delay` after now.
    pub fn after(&self, delay: Duration) -> DateTime<Utc> {
        offset(self.now, delay)
    }
}

impl Default for VirtualClock {
    fn default() -> Self {
        Self::starting_at(Utc::now())
    }
}

/// `instant + delay`, saturating at the maximum representable time.
pub(crate) fn offset(instant: DateTime<Utc>, delay: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(delay)
        .ok()
        .and_then(|d| instant.checked_add_signed(d))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Non-negative time from `earlier` to `later`.
pub(crate) fn since(earlier: DateTime<Utc>, later: DateTime<Utc>) -> Duration {
    later
        .signed_duration_since(earlier)
        .to_std()
        .unwrap_or(Duration::ZERO)
}
