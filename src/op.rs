//! Operation classes and blocking modes (spec §3, §4.5).

use std::fmt;
use std::str::FromStr;

use crate::errors::FsrlError;

/// The closed enumeration of rate-limitable file-system operation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationClass {
    /// Metadata queries, file open, existence checks, size/time/type lookups. Cost 1.
    Stat,
    /// Reading bytes from a file. Cost = byte count.
    Read,
    /// Writing bytes, truncating, creating directories, moving files. Cost = byte count for
    /// data writes, 1 for metadata-mutating writes.
    Write,
    /// Enumerating directory contents. Cost 1.
    List,
    /// Removing files/directories. Cost 1.
    Delete,
}

impl OperationClass {
    /// `true` only for `Read`/`Write`, the only op classes `set_burst` may target.
    pub const fn supports_burst(&self) -> bool {
        matches!(self, OperationClass::Read | OperationClass::Write)
    }

    pub const fn all() -> [OperationClass; 5] {
        [
            OperationClass::Stat,
            OperationClass::Read,
            OperationClass::Write,
            OperationClass::List,
            OperationClass::Delete,
        ]
    }
}

impl fmt::Display for OperationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OperationClass::Stat => "stat",
            OperationClass::Read => "read",
            OperationClass::Write => "write",
            OperationClass::List => "list",
            OperationClass::Delete => "delete",
        };
        f.write_str(s)
    }
}

impl FromStr for OperationClass {
    type Err = FsrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stat" => Ok(OperationClass::Stat),
            "read" => Ok(OperationClass::Read),
            "write" => Ok(OperationClass::Write),
            "list" => Ok(OperationClass::List),
            "delete" => Ok(OperationClass::Delete),
            other => Err(FsrlError::InvalidConfig(format!(
                "unknown operation class '{other}'"
            ))),
        }
    }
}

/// Whether a rate-limited call that would need to wait blocks the caller or fails fast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Blocking,
    NonBlocking,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Mode::Blocking => "blocking",
            Mode::NonBlocking => "non_blocking",
        };
        f.write_str(s)
    }
}

impl FromStr for Mode {
    type Err = FsrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "blocking" | "block" => Ok(Mode::Blocking),
            "non_blocking" | "nonblocking" => Ok(Mode::NonBlocking),
            other => Err(FsrlError::InvalidConfig(format!(
                "unknown mode '{other}'"
            ))),
        }
    }
}
