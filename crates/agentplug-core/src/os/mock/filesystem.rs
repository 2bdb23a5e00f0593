//! In-memory mock filesystem for testing plugins without touching disk.

use crate::os::traits::{FileKind, FileStat, FileSystem};
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

/// In-memory filesystem for testing.
///
/// Every instance owns its own registry, so a mock built in one test can
/// never observe files registered by another. Registering an entry
/// replaces whatever was at that path before, including everything below
/// it, the way `rm -r` followed by a create would.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    /// Map from path to file contents.
    files: HashMap<PathBuf, Vec<u8>>,
    /// Set of directories, explicit or implied by registered files.
    directories: HashSet<PathBuf>,
    /// Character devices behaving like `/dev/zero`: size 0, endless reads.
    devices: HashSet<PathBuf>,
}

impl MockFs {
    /// Creates a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a file with the given content, replacing any previous
    /// entry at the same path.
    ///
    /// Parent directories are automatically created; a registered file in
    /// the way of a parent is turned into a directory.
    pub fn mock_file(&mut self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.remove_tree(&path);
        self.files.insert(path, content.into());
    }

    /// Builder form of [`MockFs::mock_file`].
    pub fn with_file(mut self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) -> Self {
        self.mock_file(path, content);
        self
    }

    /// Adds an empty directory.
    pub fn add_dir(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.files.remove(&path);
        self.devices.remove(&path);
        self.directories.insert(path);
    }

    /// Adds a device that reports size 0 and yields zero bytes forever.
    pub fn add_device(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.remove_tree(&path);
        self.devices.insert(path);
    }

    /// Number of registered files.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    fn add_parents(&mut self, path: &Path) {
        let mut parent = path.parent();
        while let Some(p) = parent {
            if !p.as_os_str().is_empty() {
                self.files.remove(p);
                self.devices.remove(p);
                self.directories.insert(p.to_path_buf());
            }
            parent = p.parent();
        }
    }

    /// Drops `path` and every entry below it.
    fn remove_tree(&mut self, path: &Path) {
        self.files.retain(|p, _| !p.starts_with(path));
        self.directories.retain(|p| !p.starts_with(path));
        self.devices.retain(|p| !p.starts_with(path));
    }

    /// Error for a path that is not registered.
    ///
    /// Walking through a registered file (`file.txt/child`) is reported the
    /// way the kernel does it, as `NotADirectory`, not as absence.
    fn missing(&self, path: &Path) -> io::Error {
        let through_file = path.ancestors().skip(1).any(|ancestor| {
            self.files.contains_key(ancestor) || self.devices.contains(ancestor)
        });
        if through_file {
            io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("not a directory: {:?}", path),
            )
        } else {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {:?}", path),
            )
        }
    }
}

impl FileSystem for MockFs {
    fn stat(&self, path: &Path) -> io::Result<FileStat> {
        if let Some(content) = self.files.get(path) {
            return Ok(FileStat {
                kind: FileKind::File,
                size: content.len() as u64,
            });
        }
        if self.directories.contains(path) {
            return Ok(FileStat {
                kind: FileKind::Dir,
                size: 0,
            });
        }
        if self.devices.contains(path) {
            return Ok(FileStat {
                kind: FileKind::Other,
                size: 0,
            });
        }
        Err(self.missing(path))
    }

    fn read(&self, path: &Path, limit: u64) -> io::Result<Vec<u8>> {
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        if let Some(content) = self.files.get(path) {
            return Ok(content[..content.len().min(limit)].to_vec());
        }
        if self.devices.contains(path) {
            return Ok(vec![0; limit]);
        }
        if self.directories.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("is a directory: {:?}", path),
            ));
        }
        Err(self.missing(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_mock_fs_mock_file() {
        let mut fs = MockFs::new();
        fs.mock_file("/var/log/agent.log", "started\n");

        assert!(fs.exists(Path::new("/var/log/agent.log")).unwrap());
        assert_eq!(fs.stat(Path::new("/var/log")).unwrap().kind, FileKind::Dir);
        assert_eq!(
            fs.read(Path::new("/var/log/agent.log"), 1024).unwrap(),
            b"started\n"
        );
    }

    #[test]
    fn test_mock_fs_relative_path() {
        let fs = MockFs::new().with_file("text.txt", "1234");
        assert!(fs.exists(Path::new("text.txt")).unwrap());
        assert!(!fs.exists(Path::new("text2.txt")).unwrap());
    }

    #[test]
    fn test_mock_fs_last_write_wins() {
        let mut fs = MockFs::new();
        fs.mock_file("a.txt", "first");
        fs.mock_file("a.txt", "second, longer");

        assert_eq!(fs.file_count(), 1);
        assert_eq!(fs.stat(Path::new("a.txt")).unwrap().size, 14);
        assert_eq!(fs.read(Path::new("a.txt"), 1024).unwrap(), b"second, longer");
        assert_eq!(fs.read(Path::new("a.txt"), 6).unwrap(), b"second");
    }

    #[test]
    fn test_mock_fs_directories_are_not_files() {
        let mut fs = MockFs::new();
        fs.add_dir("/srv/data");

        assert!(!fs.exists(Path::new("/srv/data")).unwrap());
        assert!(!fs.exists(Path::new("/srv")).unwrap());
        let err = fs.read(Path::new("/srv/data"), 16).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::IsADirectory);
    }

    #[test]
    fn test_mock_fs_not_found() {
        let fs = MockFs::new();
        let err = fs.read(Path::new("/nonexistent"), 16).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(!fs.exists(Path::new("/nonexistent")).unwrap());
    }

    #[test]
    fn test_mock_fs_traversal_through_file() {
        let fs = MockFs::new().with_file("/etc/hosts", "127.0.0.1 localhost\n");

        let err = fs.stat(Path::new("/etc/hosts/extra")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotADirectory);
        let err = fs.exists(Path::new("/etc/hosts/extra")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IoFailure);
    }

    #[test]
    fn test_mock_fs_file_replaces_directory_tree() {
        let mut fs = MockFs::new();
        fs.mock_file("a/b", "nested");
        fs.mock_file("a", "flat");

        assert!(fs.exists(Path::new("a")).unwrap());
        assert_eq!(fs.stat(Path::new("a")).unwrap().kind, FileKind::File);
        let err = fs.stat(Path::new("a/b")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotADirectory);
        assert_eq!(fs.file_count(), 1);
    }

    #[test]
    fn test_mock_fs_file_under_file_turns_parent_into_directory() {
        let mut fs = MockFs::new();
        fs.mock_file("a", "flat");
        fs.mock_file("a/b", "nested");

        assert!(!fs.exists(Path::new("a")).unwrap());
        assert_eq!(fs.stat(Path::new("a")).unwrap().kind, FileKind::Dir);
        assert!(fs.exists(Path::new("a/b")).unwrap());
    }

    #[test]
    fn test_mock_fs_device_reads_are_bounded() {
        let mut fs = MockFs::new();
        fs.add_device("/dev/zero");

        let stat = fs.stat(Path::new("/dev/zero")).unwrap();
        assert_eq!(stat.kind, FileKind::Other);
        assert_eq!(stat.size, 0);
        assert!(!fs.exists(Path::new("/dev/zero")).unwrap());
        assert_eq!(fs.read(Path::new("/dev/zero"), 100).unwrap(), vec![0; 100]);
    }

    #[test]
    fn test_mock_fs_instances_are_isolated() {
        let mut first = MockFs::new();
        first.mock_file("shared.txt", "x");

        let second = MockFs::new();
        assert!(!second.exists(Path::new("shared.txt")).unwrap());
        assert_eq!(second.file_count(), 0);
    }

    #[test]
    fn test_mock_fs_concurrent_readers() {
        let fs = std::sync::Arc::new(MockFs::new().with_file("text.txt", "1234"));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let fs = fs.clone();
                std::thread::spawn(move || fs.exists(Path::new("text.txt")).unwrap())
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
