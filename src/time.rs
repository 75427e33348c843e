// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Monotonic time source and the periodic timer used for status reports.

/// Free-running time since boot.
///
/// One implementation exists per target: `hw::SysTickClock` on the board and a fake clock in
/// tests. Both counters must be monotonic and must never wrap during the life of the process.
pub trait Clock {
    /// Milliseconds since boot.
    fn millis(&self) -> u64;

    /// Microseconds since boot.
    fn micros(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
    #[inline]
    fn millis(&self) -> u64 {
        (**self).millis()
    }

    #[inline]
    fn micros(&self) -> u64 {
        (**self).micros()
    }
}

/// Fires once per period. Polled from the main loop; never blocks.
#[derive(Copy, Clone, Debug)]
pub struct PeriodicTimer {
    period_ms: u64,
    next_ms: u64,
}

impl PeriodicTimer {
    /// Create a timer whose first expiry is one period after `now_ms`.
    pub fn new(period_ms: u32, now_ms: u64) -> Self {
        Self {
            period_ms: period_ms as u64,
            next_ms: now_ms + period_ms as u64,
        }
    }

    /// Returns true when the period has elapsed and rearms for one period after `now_ms`.
    ///
    /// Missed periods are not replayed.
    pub fn trigger_and_next(&mut self, now_ms: u64) -> bool {
        if now_ms < self.next_ms {
            return false;
        }
        self.next_ms = now_ms + self.period_ms;
        true
    }

    #[inline]
    pub fn next_ms(&self) -> u64 {
        self.next_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeClock;

    #[test]
    fn timer_fires_once_per_period() {
        let mut timer = PeriodicTimer::new(200, 0);
        assert!(!timer.trigger_and_next(0));
        assert!(!timer.trigger_and_next(199));
        assert!(timer.trigger_and_next(200));
        assert!(!timer.trigger_and_next(201));
        assert_eq!(timer.next_ms(), 400);
    }

    #[test]
    fn late_poll_does_not_burst() {
        let mut timer = PeriodicTimer::new(200, 0);
        assert!(timer.trigger_and_next(1_000));
        assert!(!timer.trigger_and_next(1_100));
        assert!(timer.trigger_and_next(1_200));
    }

    #[test]
    fn clock_through_reference() {
        let clock = FakeClock::new();
        clock.advance_us(2_500);
        let by_ref: &FakeClock = &clock;
        assert_eq!(Clock::micros(&by_ref), 2_500);
        assert_eq!(Clock::millis(&by_ref), 2);
    }
}
