//! Clock - Injectable Time Source
//!
//! `TigerStyle`: No component reads the system time directly. Engines take a
//! `Clock` so cooldown windows can be tested with [`SimClock`](crate::dst::SimClock).

use chrono::{DateTime, Utc};

/// Source of "now" for cooldown checks and record timestamps.
pub trait Clock: Send + Sync {
    /// Current time in milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;

    /// Current time as a `DateTime<Utc>`.
    fn now(&self) -> DateTime<Utc> {
        let ms = i64::try_from(self.now_ms()).unwrap_or(i64::MAX);
        DateTime::from_timestamp_millis(ms).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// Wall-clock time for production use.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Create a new system clock.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_after_2024() {
        let clock = SystemClock::new();
        // 2024-01-01T00:00:00Z
        assert!(clock.now_ms() > 1_704_067_200_000);
    }

    #[test]
    fn test_system_clock_now_matches_now_ms() {
        let clock = SystemClock::new();
        let before = clock.now_ms();
        let now = clock.now();
        let after = clock.now_ms();

        let now_ms = u64::try_from(now.timestamp_millis()).unwrap();
        assert!(now_ms >= before && now_ms <= after);
    }
}
