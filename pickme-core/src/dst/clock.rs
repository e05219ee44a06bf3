//! SimClock - Simulated Time
//!
//! TigerStyle: Deterministic, controllable time for simulation.
//! Cooldown windows are days long, so tests move time explicitly instead of
//! waiting on it.

use crate::clock::Clock;
use crate::constants::{DST_TIME_ADVANCE_MS_MAX, TIME_MS_PER_DAY};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A simulated clock for deterministic testing.
///
/// Time only moves forward. Clones share the same underlying counter, so a
/// clock handed to the picker can still be advanced by the test that made it.
#[derive(Debug, Clone)]
pub struct SimClock {
    current_ms: Arc<AtomicU64>,
}

impl SimClock {
    /// Create a new clock starting at the Unix epoch.
    ///
    /// # Example
    /// ```
    /// use pickme_core::dst::SimClock;
    /// let clock = SimClock::new();
    /// assert_eq!(clock.now_ms(), 0);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::at_ms(0)
    }

    /// Create a clock starting at the given millisecond timestamp.
    #[must_use]
    pub fn at_ms(start_ms: u64) -> Self {
        Self {
            current_ms: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    /// Create a clock starting at the given instant.
    ///
    /// # Panics
    /// Panics if `dt` is before the Unix epoch.
    #[must_use]
    pub fn at_datetime(dt: DateTime<Utc>) -> Self {
        let ms = u64::try_from(dt.timestamp_millis()).expect("datetime must not precede epoch");
        Self::at_ms(ms)
    }

    /// Current time in milliseconds since the epoch.
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.current_ms.load(Ordering::SeqCst)
    }

    /// Current time as a `DateTime<Utc>`.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        Clock::now(self)
    }

    /// The calendar day (UTC) the clock is on.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// Advance time by the given milliseconds and return the new time.
    ///
    /// # Panics
    /// Panics if `ms` exceeds `DST_TIME_ADVANCE_MS_MAX`.
    pub fn advance_ms(&self, ms: u64) -> u64 {
        assert!(
            ms <= DST_TIME_ADVANCE_MS_MAX,
            "advance_ms({ms}) exceeds max ({DST_TIME_ADVANCE_MS_MAX})"
        );

        let before = self.current_ms.fetch_add(ms, Ordering::SeqCst);
        let after = before.saturating_add(ms);

        assert!(after >= before, "time must not go backwards");
        after
    }

    /// Advance time by whole days.
    pub fn advance_days(&self, days: u64) -> u64 {
        self.advance_ms(days * TIME_MS_PER_DAY)
    }

    /// Advance time by a chrono `Duration`.
    ///
    /// # Panics
    /// Panics if the duration is negative.
    pub fn advance(&self, duration: Duration) -> u64 {
        assert!(duration >= Duration::zero(), "cannot go back in time");

        let delta_ms = u64::try_from(duration.num_milliseconds()).unwrap_or(0);
        self.advance_ms(delta_ms)
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SimClock {
    fn now_ms(&self) -> u64 {
        self.current_ms.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_epoch() {
        let clock = SimClock::new();
        assert_eq!(clock.now(), DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(clock.today(), DateTime::<Utc>::UNIX_EPOCH.date_naive());
    }

    #[test]
    fn test_at_datetime() {
        let dt = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .to_utc();
        let clock = SimClock::at_datetime(dt);
        assert_eq!(clock.now(), dt);
    }

    #[test]
    fn test_today_rolls_over_at_midnight() {
        let clock = SimClock::at_ms(TIME_MS_PER_DAY - 1);
        let first = clock.today();

        clock.advance_ms(1);

        assert_eq!(clock.today(), first.succ_opt().unwrap());
    }

    #[test]
    fn test_advance_days_and_duration() {
        let clock = SimClock::new();

        clock.advance_days(7);
        clock.advance(Duration::seconds(10));

        assert_eq!(clock.now_ms(), 7 * TIME_MS_PER_DAY + 10_000);
    }

    #[test]
    #[should_panic(expected = "advance_ms")]
    fn test_advance_exceeds_max() {
        let clock = SimClock::new();
        clock.advance_ms(DST_TIME_ADVANCE_MS_MAX + 1);
    }

    #[test]
    #[should_panic(expected = "cannot go back in time")]
    fn test_negative_duration_rejected() {
        SimClock::new().advance(Duration::hours(-1));
    }

    #[test]
    fn test_clone_shares_time() {
        let clock = SimClock::new();
        let handed_out = clock.clone();

        clock.advance_days(3);

        assert_eq!(handed_out.now_ms(), 3 * TIME_MS_PER_DAY);
    }

    #[test]
    fn test_clock_trait_object() {
        let clock = SimClock::at_ms(5000);
        let dyn_clock: &dyn Clock = &clock;
        assert_eq!(dyn_clock.now().timestamp_millis(), 5000);
    }
}
