//! A time-keeping abstraction (nanoseconds) that works for storing in an atomic integer.

use std::fmt;
use std::ops::{Add, Mul, Sub};
use std::time::Duration;

/// A signed count of nanoseconds from a reference point.
///
/// `Nanos` backs both [`crate::state::LimiterState`]'s atomic counter and
/// [`crate::clock::Clock::TimePoint`] arithmetic. Using a plain `i64` keeps the state atomic
/// (`AtomicI64`) and lets the `tat_ns` clamp in the GCRA admission test use ordinary integer
/// comparisons.
#[derive(PartialEq, Eq, Default, Clone, Copy, PartialOrd, Ord, Hash)]
pub struct Nanos(i64);

impl Nanos {
    pub const ZERO: Nanos = Nanos(0);

    /// The largest representable duration, used as the "never" sentinel for delay tolerance
    /// when a quota has no burst cap.
    pub const MAX: Nanos = Nanos(i64::MAX);

    pub const fn new(n: i64) -> Self {
        Nanos(n)
    }

    pub const fn as_i64(self) -> i64 {
        self.0
    }

    pub fn saturating_add(self, rhs: Nanos) -> Nanos {
        Nanos(self.0.saturating_add(rhs.0))
    }

    pub fn saturating_sub(self, rhs: Nanos) -> Nanos {
        Nanos(self.0.saturating_sub(rhs.0))
    }

    pub fn saturating_mul(self, rhs: u64) -> Nanos {
        match i64::try_from(rhs) {
            Ok(rhs) => Nanos(self.0.saturating_mul(rhs)),
            Err(_) => Nanos::MAX,
        }
    }
}

impl From<Duration> for Nanos {
    fn from(d: Duration) -> Self {
        Nanos(i64::try_from(d.as_nanos()).unwrap_or(i64::MAX))
    }
}

impl From<Nanos> for Duration {
    fn from(n: Nanos) -> Self {
        Duration::from_nanos(n.0.max(0) as u64)
    }
}

impl fmt::Debug for Nanos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "Nanos({:?})", Duration::from(*self))
    }
}

impl Add for Nanos {
    type Output = Nanos;
    fn add(self, rhs: Nanos) -> Nanos {
        self.saturating_add(rhs)
    }
}

impl Sub for Nanos {
    type Output = Nanos;
    fn sub(self, rhs: Nanos) -> Nanos {
        self.saturating_sub(rhs)
    }
}

impl Add<Duration> for Nanos {
    type Output = Nanos;
    fn add(self, rhs: Duration) -> Nanos {
        self + Nanos::from(rhs)
    }
}

impl Mul<u64> for Nanos {
    type Output = Nanos;
    fn mul(self, rhs: u64) -> Nanos {
        self.saturating_mul(rhs)
    }
}
