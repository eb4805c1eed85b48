//! The GCRA admission core (spec §4.4).

use std::time::Duration;

use crate::clock::{Clock, Reference};
use crate::nanos::Nanos;
use crate::quota::Quota;
use crate::state::LimiterState;

/// The result of a non-blocking admission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome<P> {
    /// The request was admitted; state has been updated.
    Admitted,
    /// The request would need to wait until `ready_at` (`wait` from now) before it conforms.
    /// State was **not** touched.
    Wait { ready_at: P, wait: Duration },
    /// The request's cost exceeds the configured burst; it can never be admitted as-is.
    /// State was not touched.
    Exceeds,
}

/// The result of a blocking admission. Never carries a wait — the caller already slept
/// through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireResult {
    Admitted,
    Exceeds,
}

/// A GCRA rate limiter bound to one [`Quota`], one [`LimiterState`], and one [`Clock`].
///
/// `Limiter` is the only place `tat_ns` is touched. Every admission attempt is lock-free: it
/// loads the atomic, computes the next theoretical arrival time, and either publishes it with
/// a CAS (on success) or returns a `Wait`/`Exceeds` outcome without mutating anything.
pub struct Limiter<C: Clock> {
    quota: Quota,
    state: LimiterState,
    clock: C,
    start: C::TimePoint,
}

impl<C: Clock> Limiter<C> {
    /// Builds a fresh limiter for `quota`, idle (as if newly created), against `clock`.
    pub fn new(quota: Quota, clock: C) -> Self {
        let start = clock.now();
        Limiter {
            quota,
            state: LimiterState::new(),
            clock,
            start,
        }
    }

    pub fn quota(&self) -> Quota {
        self.quota
    }

    /// Attempts to admit a request of cost `n` without blocking.
    pub fn try_acquire_immediate(&self, n: u64) -> Outcome<C::TimePoint> {
        if n == 0 {
            return Outcome::Admitted;
        }
        if !self.quota.burst_unlimited() && n > self.quota.burst() {
            return Outcome::Exceeds;
        }
        if self.quota.rate_unlimited() {
            return Outcome::Admitted;
        }

        let now = self.clock.now();
        let now_ns = Nanos::from(now.duration_since(self.start));
        let inc_ns = self.quota.emission_interval() * n;
        let tol_ns = self.quota.delay_tolerance();

        loop {
            let tat = self.state.load();
            let base = if tat > now_ns { tat } else { now_ns };
            let new_tat = base + inc_ns;
            let earliest = new_tat.saturating_sub(tol_ns);

            if earliest > now_ns {
                let wait = Duration::from(earliest.saturating_sub(now_ns));
                let ready_at = self.start + Duration::from(earliest);
                return Outcome::Wait { ready_at, wait };
            }

            match self.state.compare_exchange(tat, new_tat) {
                Ok(()) => return Outcome::Admitted,
                Err(_actual) => continue,
            }
        }
    }

    /// Admits a request of cost `n`, sleeping through any required wait.
    ///
    /// Loops until admission succeeds or the request is found to exceed the burst cap; the
    /// loop is bounded only by physical time, there is no cancellation.
    pub fn acquire_blocking(&self, n: u64) -> AcquireResult {
        loop {
            match self.try_acquire_immediate(n) {
                Outcome::Admitted => return AcquireResult::Admitted,
                Outcome::Exceeds => return AcquireResult::Exceeds,
                Outcome::Wait { ready_at, .. } => self.clock.sleep_until(ready_at),
            }
        }
    }
}
