//! The limiter's sole mutable shared datum (spec §3, §4.3).

use std::sync::atomic::{AtomicI64, Ordering};

use crate::nanos::Nanos;

/// A single atomic "theoretical arrival time", in nanoseconds since the owning clock's epoch.
///
/// `tat_ns` is the only mutable shared state a [`crate::limiter::Limiter`] touches on its hot
/// path. It starts at zero (an idle bucket) and only ever advances via a successful
/// compare-and-swap — a request that would need to wait never publishes a new value, so
/// pending waiters can't reserve capacity (spec §4.4 "Rationale and invariants").
#[derive(Debug, Default)]
pub struct LimiterState {
    tat_ns: AtomicI64,
}

impl LimiterState {
    pub fn new() -> Self {
        LimiterState {
            tat_ns: AtomicI64::new(0),
        }
    }

    pub(crate) fn load(&self) -> Nanos {
        Nanos::new(self.tat_ns.load(Ordering::Acquire))
    }

    /// Attempts to replace `current` with `new`. Returns `Ok(())` on success, or `Err(actual)`
    /// with the value observed instead (the caller reloads and retries locally — this never
    /// involves a wait).
    pub(crate) fn compare_exchange(&self, current: Nanos, new: Nanos) -> Result<(), Nanos> {
        self.tat_ns
            .compare_exchange_weak(
                current.as_i64(),
                new.as_i64(),
                Ordering::Release,
                Ordering::Relaxed,
            )
            .map(|_| ())
            .map_err(Nanos::new)
    }
}
