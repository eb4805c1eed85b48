//! Rate-limiting quotas.

use std::time::Duration;

use crate::errors::FsrlError;
use crate::nanos::Nanos;

/// An immutable `(rate, burst)` pair, plus the GCRA parameters derived from it.
///
/// At least one of `rate`/`burst` must be non-zero; a quota with both at zero describes "no
/// limiter" and is rejected at construction (callers that want no limit simply don't configure
/// a key — see [`crate::config::ConfigRegistry::set_rate`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    rate: u64,
    burst: u64,
}

impl Quota {
    /// Constructs a quota, rejecting the all-zero case.
    pub fn new(rate: u64, burst: u64) -> Result<Quota, FsrlError> {
        if rate == 0 && burst == 0 {
            return Err(FsrlError::InvalidConfig(
                "quota requires a non-zero rate or a non-zero burst".into(),
            ));
        }
        Ok(Quota { rate, burst })
    }

    pub const fn rate(&self) -> u64 {
        self.rate
    }

    pub const fn burst(&self) -> u64 {
        self.burst
    }

    /// `true` when rate limiting is disabled and only the burst cap applies.
    pub const fn rate_unlimited(&self) -> bool {
        self.rate == 0
    }

    /// `true` when no request can ever be rejected for being "too big" (cost is unbounded).
    pub const fn burst_unlimited(&self) -> bool {
        self.burst == 0
    }

    /// `1s / rate`, the nominal time a single unit of cost "costs" to admit.
    ///
    /// Zero when rate limiting is disabled.
    pub fn emission_interval(&self) -> Nanos {
        if self.rate == 0 {
            Nanos::ZERO
        } else {
            let nanos_per_sec = Duration::from_secs(1).as_nanos();
            Nanos::new((nanos_per_sec / self.rate as u128) as i64)
        }
    }

    /// `burst * emission_interval`: the window of future credit GCRA tolerates.
    ///
    /// `Nanos::MAX` when either side of the product is unbounded: rate limiting itself
    /// disabled (`rate == 0`, see [`Quota::rate_unlimited`] — the tolerance is never
    /// consulted on that path, short-circuited in [`crate::limiter::Limiter`] before any
    /// GCRA math runs), or the burst cap disabled (`burst == 0`). The latter is a real
    /// GCRA constraint, not just a convenient sentinel: admitting any cost `n >= 1` at all
    /// requires `tol_ns >= n * emission_interval`, so a tolerance of exactly zero would
    /// make every admission wait forever (`earliest` keeps receding by a full interval on
    /// every retry, since `tol` never offsets it) — a deadlock, not "strict pacing".
    /// `Nanos::MAX` is therefore the only value consistent with the GCRA admission test
    /// in §4.4 when `burst == 0`: it always admits, effectively leaving such a key
    /// unrateable via GCRA (spec §4.5's non-byte ops — STAT, LIST, DELETE — can only ever
    /// have `burst == 0`, since [`crate::op::OperationClass::supports_burst`] rejects
    /// `set_burst` on them; `set_rate` alone does not meaningfully throttle them).
    pub fn delay_tolerance(&self) -> Nanos {
        if self.rate == 0 || self.burst == 0 {
            Nanos::MAX
        } else {
            self.emission_interval().saturating_mul(self.burst)
        }
    }
}
