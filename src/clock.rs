//! Clock Module
//!
//! Current-time providers consulted by every expiry comparison.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

// == Clock Trait ==
/// Source of "now" for expiry checks.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Returns the current wall-clock time.
    fn now(&self) -> DateTime<Utc>;
}

// == System Clock ==
/// Wall-clock time from the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// == Manual Clock ==
/// A clock that only moves when told to.
///
/// Tests use it to step past expiry timestamps without sleeping.
#[derive(Debug)]
pub struct ManualClock {
    origin: DateTime<Utc>,
    offset_ms: AtomicI64,
}

impl ManualClock {
    /// Creates a clock frozen at `origin`.
    pub fn new(origin: DateTime<Utc>) -> Self {
        Self {
            origin,
            offset_ms: AtomicI64::new(0),
        }
    }

    /// Creates a clock frozen at the current system time.
    pub fn starting_now() -> Self {
        Self::new(Utc::now())
    }

    /// Moves the clock forward by `by`, stopping at the latest representable
    /// time.
    pub fn advance(&self, by: Duration) {
        let ms = i64::try_from(by.as_millis()).unwrap_or(i64::MAX);
        let limit = self.max_offset_ms();
        let _ = self
            .offset_ms
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |offset| {
                Some(offset.saturating_add(ms).min(limit))
            });
    }

    /// Jumps the clock to `at` (which may be in the past).
    pub fn set(&self, at: DateTime<Utc>) {
        let offset = (at - self.origin).num_milliseconds();
        self.offset_ms.store(offset, Ordering::SeqCst);
    }

    /// Largest offset that still lands on a valid `DateTime<Utc>`.
    fn max_offset_ms(&self) -> i64 {
        (DateTime::<Utc>::MAX_UTC - self.origin).num_milliseconds()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.origin + TimeDelta::milliseconds(self.offset_ms.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_is_frozen() {
        let clock = ManualClock::starting_now();
        let first = clock.now();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(clock.now(), first);
    }

    #[test]
    fn test_manual_clock_advance() {
        let clock = ManualClock::starting_now();
        let start = clock.now();

        clock.advance(Duration::from_millis(1500));

        assert_eq!(clock.now() - start, TimeDelta::milliseconds(1500));
    }

    #[test]
    fn test_manual_clock_advance_saturates() {
        let clock = ManualClock::starting_now();

        clock.advance(Duration::from_secs(u64::MAX));
        let far = clock.now();
        clock.advance(Duration::from_secs(u64::MAX));

        assert_eq!(clock.now(), far);
        assert!(far <= DateTime::<Utc>::MAX_UTC);
        assert!(far > Utc::now());
    }

    #[test]
    fn test_manual_clock_set() {
        let clock = ManualClock::starting_now();
        let start = clock.now();
        let target = start + TimeDelta::seconds(30);

        clock.set(target);
        assert_eq!(clock.now(), target);

        clock.set(start);
        assert_eq!(clock.now(), start);
    }

    #[test]
    fn test_system_clock_moves_forward() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
