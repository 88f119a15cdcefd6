//! Clock and random implementations.

#[cfg(test)]
use std::sync::atomic::{AtomicI64, Ordering};

#[cfg(test)]
use chrono::Duration;
use chrono::{DateTime, Utc};

use crate::infrastructure::ports::{ClockPort, RandomPort};

/// System clock - uses real time.
#[derive(Debug, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// System random - d20 rolls from the thread-local generator.
#[derive(Debug, Default)]
pub struct SystemRandom;

impl SystemRandom {
    pub fn new() -> Self {
        Self
    }
}

impl RandomPort for SystemRandom {
    fn gen_range(&self, min: i32, max: i32) -> i32 {
        use rand::Rng;
        if min >= max {
            return min;
        }
        rand::thread_rng().gen_range(min..=max)
    }
}

/// Seed for callers that did not pick one: milliseconds mod 10 000.
pub fn seed_from_clock(clock: &dyn ClockPort) -> i64 {
    clock.now().timestamp_millis().rem_euclid(10_000)
}

/// Fixed clock for testing.
#[cfg(test)]
pub struct FixedClock(pub DateTime<Utc>);

#[cfg(test)]
impl ClockPort for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Clock that advances one second per reading.
#[cfg(test)]
pub struct SteppingClock {
    start: DateTime<Utc>,
    ticks: AtomicI64,
}

#[cfg(test)]
impl SteppingClock {
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            start,
            ticks: AtomicI64::new(0),
        }
    }
}

#[cfg(test)]
impl ClockPort for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        self.start + Duration::seconds(tick)
    }
}

/// Fixed random for testing.
#[cfg(test)]
pub struct FixedRandom(pub i32);

#[cfg(test)]
impl RandomPort for FixedRandom {
    fn gen_range(&self, _min: i32, _max: i32) -> i32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::MockClockPort;
    use chrono::TimeZone;

    #[test]
    fn system_random_stays_on_the_die() {
        let random = SystemRandom::new();
        for _ in 0..200 {
            let roll = random.gen_range(1, 20);
            assert!((1..=20).contains(&roll));
        }
        assert_eq!(random.gen_range(5, 5), 5);
    }

    #[test]
    fn seed_from_clock_is_bounded() {
        let mut clock = MockClockPort::new();
        clock.expect_now().times(1).returning(|| {
            Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 7)
                .single()
                .expect("valid timestamp")
        });
        let seed = seed_from_clock(&clock);
        assert!((0..10_000).contains(&seed));
        assert_eq!(seed, 7_000);
    }

    #[test]
    fn stepping_clock_advances() {
        let start = Utc
            .with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp");
        let clock = SteppingClock::starting_at(start);
        assert_eq!(clock.now(), start);
        assert_eq!(clock.now(), start + Duration::seconds(1));
    }
}
