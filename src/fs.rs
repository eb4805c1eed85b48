//! The backend capability set the façade wraps (spec §6).
//!
//! `FileSystem` and `FileHandle` are the collaborator contract: anything satisfying them can
//! be wrapped by [`crate::facade::InterceptionFacade`]. Neither trait is rate-limited itself —
//! rate limiting is entirely the façade's concern, layered on top.

use crate::errors::FsrlError;

/// The kind of entry a path resolves to, as reported by `get_file_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    File,
    Directory,
    Symlink,
    Other,
}

/// A single open file/handle on the backend.
pub trait FileHandle: Send {
    fn seek(&mut self, offset: u64) -> Result<(), FsrlError>;
    fn reset(&mut self) -> Result<(), FsrlError>;
    fn seek_position(&self) -> u64;
    fn can_seek(&self) -> bool;
    fn on_disk_file(&self) -> bool;
    fn sync(&mut self) -> Result<(), FsrlError>;
    fn close(&mut self);
}

/// The file-system capability set a backend must provide to be wrapped by the façade.
///
/// Every byte-bearing method takes or returns a byte count so the façade can compute a GCRA
/// cost (spec §4.8); every other method costs exactly 1 unit against its op class, or is not
/// rate-limited at all (seek family, sync, close).
pub trait FileSystem: Send + Sync {
    type Handle: FileHandle;

    fn open_file(&self, path: &str) -> Result<Self::Handle, FsrlError>;
    fn read(&self, handle: &mut Self::Handle, buf: &mut [u8]) -> Result<usize, FsrlError>;
    fn read_at(
        &self,
        handle: &mut Self::Handle,
        buf: &mut [u8],
        offset: u64,
    ) -> Result<usize, FsrlError>;
    fn write(&self, handle: &mut Self::Handle, buf: &[u8]) -> Result<usize, FsrlError>;
    fn write_at(
        &self,
        handle: &mut Self::Handle,
        buf: &[u8],
        offset: u64,
    ) -> Result<usize, FsrlError>;
    fn truncate(&self, handle: &mut Self::Handle, new_size: u64) -> Result<(), FsrlError>;

    fn get_file_size(&self, path: &str) -> Result<u64, FsrlError>;
    fn get_last_modified_time(&self, path: &str) -> Result<u64, FsrlError>;
    fn get_file_type(&self, path: &str) -> Result<FileType, FsrlError>;
    fn file_exists(&self, path: &str) -> bool;
    fn is_pipe(&self, path: &str) -> bool;
    fn directory_exists(&self, path: &str) -> bool;

    fn create_directory(&self, path: &str) -> Result<(), FsrlError>;
    fn move_file(&self, from: &str, to: &str) -> Result<(), FsrlError>;

    fn remove_file(&self, path: &str) -> Result<(), FsrlError>;
    fn try_remove_file(&self, path: &str) -> bool;
    fn remove_directory(&self, path: &str) -> Result<(), FsrlError>;

    fn glob(&self, pattern: &str) -> Result<Vec<String>, FsrlError>;
    fn list_files(&self, path: &str) -> Result<Vec<String>, FsrlError>;

    fn get_name(&self) -> &str;
    fn path_separator(&self) -> char;
}
