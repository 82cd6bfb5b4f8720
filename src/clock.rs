//! Wall-clock source for token expiry.

use time::OffsetDateTime;

/// Current time in milliseconds since the Unix epoch.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[allow(clippy::cast_possible_truncation)]
    fn now_ms(&self) -> i64 {
        (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
    }
}

/// Hand-driven clock for expiry tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ManualClock {
    now: std::sync::atomic::AtomicI64,
}

#[cfg(test)]
impl ManualClock {
    #[must_use]
    pub fn at(now_ms: i64) -> Self {
        Self { now: std::sync::atomic::AtomicI64::new(now_ms) }
    }

    pub fn advance_ms(&self, delta: i64) {
        self.now.fetch_add(delta, std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_after_2024() {
        // 2024-01-01T00:00:00Z
        assert!(SystemClock.now_ms() > 1_704_067_200_000);
    }

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::at(1_000);
        clock.advance_ms(500);
        assert_eq!(clock.now_ms(), 1_500);
    }
}
