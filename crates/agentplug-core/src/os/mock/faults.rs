//! Fault-injecting filesystem wrapper.
//!
//! Wraps another [`FileSystem`] and fails selected paths with a chosen
//! error kind, so tests can drive the failure branches of plugins
//! (permission denied, I/O errors) without privileged setup.

use crate::os::traits::{FileStat, FileSystem};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct FaultyFs<F> {
    inner: F,
    faults: HashMap<PathBuf, io::ErrorKind>,
    calls: AtomicUsize,
}

impl<F: FileSystem> FaultyFs<F> {
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            faults: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Makes every operation on `path` fail with `kind`.
    pub fn fail(mut self, path: impl AsRef<Path>, kind: io::ErrorKind) -> Self {
        self.faults.insert(path.as_ref().to_path_buf(), kind);
        self
    }

    /// Number of operations that reached this filesystem.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    fn check(&self, path: &Path) -> io::Result<()> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        match self.faults.get(path) {
            Some(kind) => Err(io::Error::new(
                *kind,
                format!("injected failure for {:?}", path),
            )),
            None => Ok(()),
        }
    }
}

impl<F: FileSystem> FileSystem for FaultyFs<F> {
    fn stat(&self, path: &Path) -> io::Result<FileStat> {
        self.check(path)?;
        self.inner.stat(path)
    }

    fn read(&self, path: &Path, limit: u64) -> io::Result<Vec<u8>> {
        self.check(path)?;
        self.inner.read(path, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::os::mock::MockFs;

    #[test]
    fn test_faulty_fs_injects_errors() {
        let mock = MockFs::new()
            .with_file("/etc/shadow", "root:*:19000::::::")
            .with_file("/etc/hostname", "node-1\n");
        let fs = FaultyFs::new(mock).fail("/etc/shadow", io::ErrorKind::PermissionDenied);

        let err = fs.exists(Path::new("/etc/shadow")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IoFailure);
        assert!(fs.exists(Path::new("/etc/hostname")).unwrap());
        assert_eq!(fs.calls(), 2);
    }

    #[test]
    fn test_faulty_fs_fails_reads() {
        let fs = FaultyFs::new(MockFs::new().with_file("data", "x"))
            .fail("data", io::ErrorKind::Other);
        assert_eq!(
            fs.read(Path::new("data"), 16).unwrap_err().kind(),
            io::ErrorKind::Other
        );
    }
}
