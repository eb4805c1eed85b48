//! Shared test-only fake backend.
//!
//! Not the crate's "fake backend that trampolines to a local file-system" named as out of
//! scope in the component list — just enough of [`fsrl::FileSystem`] to exercise the façade's
//! dispatch table end to end.

use std::collections::HashMap;
use std::sync::Mutex;

use fsrl::{FileHandle, FileSystem, FileType, FsrlError};

pub struct FakeHandle {
    path: String,
    pos: u64,
}

impl FileHandle for FakeHandle {
    fn seek(&mut self, offset: u64) -> Result<(), FsrlError> {
        self.pos = offset;
        Ok(())
    }

    fn reset(&mut self) -> Result<(), FsrlError> {
        self.pos = 0;
        Ok(())
    }

    fn seek_position(&self) -> u64 {
        self.pos
    }

    fn can_seek(&self) -> bool {
        true
    }

    fn on_disk_file(&self) -> bool {
        false
    }

    fn sync(&mut self) -> Result<(), FsrlError> {
        Ok(())
    }

    fn close(&mut self) {}
}

#[derive(Default)]
pub struct FakeFs {
    files: Mutex<HashMap<String, Vec<u8>>>,
}

impl FileSystem for FakeFs {
    type Handle = FakeHandle;

    fn open_file(&self, path: &str) -> Result<Self::Handle, FsrlError> {
        self.files.lock().unwrap().entry(path.to_string()).or_default();
        Ok(FakeHandle {
            path: path.to_string(),
            pos: 0,
        })
    }

    fn read(&self, handle: &mut Self::Handle, buf: &mut [u8]) -> Result<usize, FsrlError> {
        let files = self.files.lock().unwrap();
        let data = files.get(&handle.path).cloned().unwrap_or_default();
        let n = buf.len().min(data.len());
        buf[..n].copy_from_slice(&data[..n]);
        Ok(n)
    }

    fn read_at(
        &self,
        handle: &mut Self::Handle,
        buf: &mut [u8],
        _offset: u64,
    ) -> Result<usize, FsrlError> {
        self.read(handle, buf)
    }

    fn write(&self, handle: &mut Self::Handle, buf: &[u8]) -> Result<usize, FsrlError> {
        let mut files = self.files.lock().unwrap();
        let entry = files.entry(handle.path.clone()).or_default();
        entry.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn write_at(
        &self,
        handle: &mut Self::Handle,
        buf: &[u8],
        _offset: u64,
    ) -> Result<usize, FsrlError> {
        self.write(handle, buf)
    }

    fn truncate(&self, handle: &mut Self::Handle, new_size: u64) -> Result<(), FsrlError> {
        let mut files = self.files.lock().unwrap();
        if let Some(data) = files.get_mut(&handle.path) {
            data.truncate(new_size as usize);
        }
        Ok(())
    }

    fn get_file_size(&self, path: &str) -> Result<u64, FsrlError> {
        Ok(self.files.lock().unwrap().get(path).map(|d| d.len()).unwrap_or(0) as u64)
    }

    fn get_last_modified_time(&self, _path: &str) -> Result<u64, FsrlError> {
        Ok(0)
    }

    fn get_file_type(&self, _path: &str) -> Result<FileType, FsrlError> {
        Ok(FileType::File)
    }

    fn file_exists(&self, path: &str) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    fn is_pipe(&self, _path: &str) -> bool {
        false
    }

    fn directory_exists(&self, _path: &str) -> bool {
        true
    }

    fn create_directory(&self, _path: &str) -> Result<(), FsrlError> {
        Ok(())
    }

    fn move_file(&self, from: &str, to: &str) -> Result<(), FsrlError> {
        let mut files = self.files.lock().unwrap();
        if let Some(data) = files.remove(from) {
            files.insert(to.to_string(), data);
        }
        Ok(())
    }

    fn remove_file(&self, path: &str) -> Result<(), FsrlError> {
        self.files.lock().unwrap().remove(path);
        Ok(())
    }

    fn try_remove_file(&self, path: &str) -> bool {
        self.files.lock().unwrap().remove(path).is_some()
    }

    fn remove_directory(&self, _path: &str) -> Result<(), FsrlError> {
        Ok(())
    }

    fn glob(&self, _pattern: &str) -> Result<Vec<String>, FsrlError> {
        Ok(self.files.lock().unwrap().keys().cloned().collect())
    }

    fn list_files(&self, _path: &str) -> Result<Vec<String>, FsrlError> {
        Ok(self.files.lock().unwrap().keys().cloned().collect())
    }

    fn get_name(&self) -> &str {
        "fake"
    }

    fn path_separator(&self) -> char {
        '/'
    }
}
