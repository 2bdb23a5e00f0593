//! Abstractions for filesystem access to enable testing and mocking.
//!
//! Plugins never touch `std::fs` directly. They are handed a `FileSystem`
//! at construction, which is either the real filesystem or an in-memory
//! mock used by tests.

use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;

use crate::error::AgentError;

/// Type of a filesystem entry, after following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    File,
    Dir,
    /// Devices, sockets, FIFOs.
    Other,
}

/// Result of a stat call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub kind: FileKind,
    /// Size in bytes.
    pub size: u64,
}

/// Abstraction for filesystem operations.
///
/// Implementations must be safe to share between threads: plugins may be
/// invoked concurrently against the same instance.
pub trait FileSystem: Send + Sync {
    /// Returns metadata for `path`, following symlinks.
    ///
    /// A missing entry is reported as `io::ErrorKind::NotFound`.
    fn stat(&self, path: &Path) -> io::Result<FileStat>;

    /// Reads at most `limit` bytes from the start of a file.
    ///
    /// Never reads past `limit`, so devices and pipes that never end are
    /// safe to pass here.
    fn read(&self, path: &Path, limit: u64) -> io::Result<Vec<u8>>;

    /// Checks whether `path` names an existing regular file.
    ///
    /// Absence is `Ok(false)`, not an error. Directories and other
    /// non-regular entries are reported as `Ok(false)` as well.
    ///
    /// # Errors
    /// * `InvalidArgument` for an empty or malformed path
    /// * `Io` when the check could not be completed, e.g. permission
    ///   denied or traversal through a non-directory
    fn exists(&self, path: &Path) -> Result<bool, AgentError> {
        if path.as_os_str().is_empty() {
            return Err(AgentError::invalid_argument("path is empty"));
        }

        match self.stat(path) {
            Ok(stat) => Ok(stat.kind == FileKind::File),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AgentError::from_io(path, e)),
        }
    }
}

impl<T: FileSystem + ?Sized> FileSystem for Arc<T> {
    fn stat(&self, path: &Path) -> io::Result<FileStat> {
        (**self).stat(path)
    }

    fn read(&self, path: &Path, limit: u64) -> io::Result<Vec<u8>> {
        (**self).read(path, limit)
    }

    fn exists(&self, path: &Path) -> Result<bool, AgentError> {
        (**self).exists(path)
    }
}

impl<T: FileSystem + ?Sized> FileSystem for &T {
    fn stat(&self, path: &Path) -> io::Result<FileStat> {
        (**self).stat(path)
    }

    fn read(&self, path: &Path, limit: u64) -> io::Result<Vec<u8>> {
        (**self).read(path, limit)
    }

    fn exists(&self, path: &Path) -> Result<bool, AgentError> {
        (**self).exists(path)
    }
}

/// Real filesystem implementation that delegates to `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    /// Creates a new `RealFs` instance.
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn stat(&self, path: &Path) -> io::Result<FileStat> {
        let meta = std::fs::metadata(path)?;
        let file_type = meta.file_type();
        let kind = if file_type.is_file() {
            FileKind::File
        } else if file_type.is_dir() {
            FileKind::Dir
        } else {
            FileKind::Other
        };
        Ok(FileStat {
            kind,
            size: meta.len(),
        })
    }

    fn read(&self, path: &Path, limit: u64) -> io::Result<Vec<u8>> {
        let mut bytes = Vec::new();
        std::fs::File::open(path)?
            .take(limit)
            .read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}
