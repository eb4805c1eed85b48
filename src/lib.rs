//! A GCRA-based rate-limiting façade over a pluggable file-system abstraction.
//!
//! This crate does not implement a file-system itself. It wraps any backend that
//! implements [`fs::FileSystem`] in an [`facade::InterceptionFacade`] and enforces
//! per-`(backend, operation class)` rate limits configured through a shared
//! [`config::ConfigRegistry`], using the same virtual-scheduling (GCRA) algorithm as the
//! crate this one's admission core is grounded on.
//!
//! Typical use:
//!
//! ```
//! use std::sync::Arc;
//! use fsrl::{ConfigRegistry, Mode, OperationClass};
//!
//! let registry = Arc::new(ConfigRegistry::default());
//! registry
//!     .set_rate("local", OperationClass::Read, 1_000, Mode::NonBlocking)
//!     .unwrap();
//! registry.set_burst("local", OperationClass::Read, 2_000).unwrap();
//! ```
//!
//! then wrap a concrete [`fs::FileSystem`] impl in [`facade::InterceptionFacade::new`].

pub mod clock;
pub mod config;
pub mod errors;
pub mod facade;
pub mod fs;
pub mod limiter;
pub mod nanos;
pub mod op;
pub mod quota;
mod state;

pub use clock::{Clock, DefaultClock, MockClock, Reference, RealClock};
pub use config::{derived_backend_name, ConfigEntry, ConfigRegistry, EntryView};
pub use errors::FsrlError;
pub use facade::{FacadeFile, InterceptionFacade};
pub use fs::{FileHandle, FileSystem, FileType};
pub use limiter::{AcquireResult, Limiter, Outcome};
pub use nanos::Nanos;
pub use op::{Mode, OperationClass};
pub use quota::Quota;

/// Re-exports the names most callers need, for a single `use fsrl::prelude::*;`.
pub mod prelude {
    pub use crate::{
        ConfigRegistry, DefaultClock, FileHandle, FileSystem, FsrlError, InterceptionFacade, Mode,
        OperationClass, Quota,
    };
}
