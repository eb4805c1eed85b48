//! The error taxonomy surfaced to hosts of this crate (spec §7).

use crate::op::OperationClass;

/// Errors raised by the configuration registry and the interception façade.
#[derive(Debug, thiserror::Error)]
pub enum FsrlError {
    /// Caller fault: an unknown op/mode string, a negative value, burst configured on a
    /// non-byte op, or an unknown backend name passed to `wrap`. Never retried.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The limiter would require a wait and the caller is in non-blocking mode. Transient:
    /// retrying later (or with a smaller request) may succeed.
    #[error("rate limited on {op}: must wait {wait_ms}ms")]
    RateLimited { op: OperationClass, wait_ms: u64 },

    /// The request's cost exceeds the configured burst for that key. Permanent for this
    /// request size.
    #[error("request of cost {cost} exceeds configured burst {burst} for {op}")]
    ExceedsBurst {
        op: OperationClass,
        cost: u64,
        burst: u64,
    },

    /// Passed through unchanged from the wrapped backend.
    #[error("inner file-system error: {0}")]
    InnerFs(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// An invariant was violated (e.g. a limiter handle present with zero rate and zero
    /// burst). Treated as a fatal assertion rather than a recoverable condition.
    #[error("internal invariant violated: {0}")]
    Internal(String),
}

impl FsrlError {
    /// Wraps an arbitrary backend error as [`FsrlError::InnerFs`].
    pub fn inner_fs<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        FsrlError::InnerFs(Box::new(err))
    }
}
