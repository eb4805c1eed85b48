//! Time sources for the rate limiter.
//!
//! The [`Clock`] trait lets the GCRA core (see [`crate::limiter`]) run against either a real,
//! monotonic time source or a synthetic one driven by tests. The [`ConfigRegistry`] hands a
//! shared clock to every [`crate::limiter::Limiter`] it builds; swapping clocks (`set_clock`)
//! rebuilds those limiters against the new one.
//!
//! [`ConfigRegistry`]: crate::config::ConfigRegistry

use std::cell::Cell;
use std::fmt::Debug;
use std::ops::Add;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::nanos::Nanos;

/// A measurement from a clock: an opaque, monotonically ordered instant.
pub trait Reference:
    Sized + Add<Duration, Output = Self> + PartialEq + Eq + Ord + Copy + Clone + Debug
{
    /// The (saturating) duration between `self` and an earlier reference.
    fn duration_since(&self, earlier: Self) -> Duration;
}

/// A time source used to drive rate-limiting decisions.
///
/// Implementations must be monotonic: `now()` never returns a value earlier than a
/// previous call observed by the same thread. The real clock additionally guarantees
/// thread safety; the mock clock does not (see [`MockClock`]).
pub trait Clock: Clone {
    /// A measurement of this clock.
    type TimePoint: Reference;

    /// Returns the current time.
    fn now(&self) -> Self::TimePoint;

    /// Blocks the calling thread for `duration`.
    fn sleep_for(&self, duration: Duration);

    /// Blocks the calling thread until `deadline` is reached.
    fn sleep_until(&self, deadline: Self::TimePoint) {
        let wait = deadline.duration_since(self.now());
        if !wait.is_zero() {
            self.sleep_for(wait);
        }
    }
}

/// A nanosecond-scale opaque instant, already normalized to the clock's reference
/// point (see [`RealClock`]).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct ClockInstant(pub(crate) Nanos);

impl Add<Duration> for ClockInstant {
    type Output = ClockInstant;
    fn add(self, rhs: Duration) -> ClockInstant {
        ClockInstant(self.0 + rhs)
    }
}

impl Reference for ClockInstant {
    fn duration_since(&self, earlier: Self) -> Duration {
        Duration::from(self.0.saturating_sub(earlier.0))
    }
}

/// The real-time clock. Backed by [`quanta::Clock`] for cheap, high-resolution reads,
/// normalized to nanoseconds since the clock was constructed.
///
/// Cloning a `RealClock` shares the same `quanta::Clock` and reference point, so clones
/// agree on "now" the way the teacher crate's `QuantaClock` does.
#[derive(Debug, Clone)]
pub struct RealClock {
    clock: quanta::Clock,
    reference: quanta::Instant,
}

impl Default for RealClock {
    fn default() -> Self {
        let clock = quanta::Clock::default();
        let reference = clock.now();
        RealClock { clock, reference }
    }
}

impl Clock for RealClock {
    type TimePoint = ClockInstant;

    fn now(&self) -> ClockInstant {
        let elapsed = self.clock.now().saturating_duration_since(self.reference);
        ClockInstant(Nanos::from(elapsed))
    }

    fn sleep_for(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// The clock used when no clock is explicitly configured.
pub type DefaultClock = RealClock;

/// Converts a `std::time::Instant` based reading into a [`ClockInstant`] relative to an
/// arbitrary fixed point — used only to give [`RealClock`] a dependency-free fallback path
/// when constructed before `quanta` has calibrated (not required in practice, kept for parity
/// with the `Instant`-compatible clocks the teacher crate also ships).
#[allow(dead_code)]
fn instant_nanos(reference: Instant, now: Instant) -> Nanos {
    Nanos::from(now.saturating_duration_since(reference))
}

/// A mock clock for deterministic tests.
///
/// Per spec, the mock clock is explicitly **not** thread-safe: its stored time lives in a
/// `Cell`, not an atomic. Tests that need a shared, advanceable clock on a single thread should
/// clone the handle (cloning shares the same underlying cell via `Rc`); tests that need
/// multi-threaded determinism should use [`RealClock`] with a controlled sleep schedule
/// instead, per spec.md §4.1.
#[derive(Debug, Clone, Default)]
pub struct MockClock {
    now: Rc<Cell<i64>>,
}

impl MockClock {
    /// Creates a new mock clock starting at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the mock clock by `duration`.
    pub fn advance(&self, duration: Duration) {
        let by = Nanos::from(duration).as_i64();
        self.now.set(self.now.get().saturating_add(by));
    }
}

impl Clock for MockClock {
    type TimePoint = ClockInstant;

    fn now(&self) -> ClockInstant {
        ClockInstant(Nanos::new(self.now.get()))
    }

    /// Sleeping on the mock clock just advances it: nothing actually suspends.
    fn sleep_for(&self, duration: Duration) {
        self.advance(duration);
    }
}
