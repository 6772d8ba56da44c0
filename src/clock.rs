//! Manually driven clock for deterministic tests and replay tooling.

use chrono::{DateTime, Duration, Local, Utc};
use mockable::Clock;
use std::sync::{Arc, PoisonError, RwLock};

/// Clock whose time only changes when told to.
///
/// Clones share the same underlying instant, so a test can hand one clone to
/// a service and advance time through another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<RwLock<DateTime<Utc>>>,
}

impl ManualClock {
    /// Creates a clock frozen at `start`.
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(RwLock::new(start)),
        }
    }

    /// Moves the clock forward (or backward, for negative durations).
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.write().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }

    /// Jumps the clock to `instant`.
    pub fn set(&self, instant: DateTime<Utc>) {
        let mut now = self.now.write().unwrap_or_else(PoisonError::into_inner);
        *now = instant;
    }
}

impl Clock for ManualClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn clones_share_the_same_instant() {
        let start = Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).single();
        let Some(start_instant) = start else {
            panic!("valid start instant");
        };
        let clock = ManualClock::new(start_instant);
        let handle = clock.clone();

        handle.advance(Duration::hours(2));

        assert_eq!(clock.utc(), start_instant + Duration::hours(2));
    }
}
