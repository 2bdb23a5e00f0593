//! `vfs.file.*` items: existence, size and contents of a single file.

use std::io;
use std::path::Path;

use crate::error::AgentError;
use crate::os::{FileKind, FileSystem};
use crate::plugin::{ExecContext, ItemValue, Metric, Plugin, single_param};

/// Largest file `vfs.file.contents` will return.
pub const MAX_CONTENTS_SIZE: u64 = 64 * 1024;

const METRICS: &[Metric] = &[
    Metric {
        key: "vfs.file.contents",
        description: "Retrieves the contents of a file.",
        sample_params: &["/etc/hostname"],
    },
    Metric {
        key: "vfs.file.exists",
        description: "Returns 1 if the regular file exists, 0 otherwise.",
        sample_params: &["/etc/passwd"],
    },
    Metric {
        key: "vfs.file.size",
        description: "Returns the file size in bytes.",
        sample_params: &["/etc/passwd"],
    },
];

/// Plugin serving file items through an injected [`FileSystem`].
#[derive(Debug, Clone, Default)]
pub struct VfsFilePlugin<F> {
    fs: F,
}

impl<F: FileSystem> VfsFilePlugin<F> {
    pub fn new(fs: F) -> Self {
        Self { fs }
    }

    fn exists(&self, params: &[String]) -> Result<ItemValue, AgentError> {
        let path = single_param(params)?;
        let found = self.fs.exists(Path::new(path))?;
        Ok(ItemValue::from(found))
    }

    fn size(&self, params: &[String]) -> Result<ItemValue, AgentError> {
        let path = single_param(params)?;
        let stat = self
            .fs
            .stat(Path::new(path))
            .map_err(|e| AgentError::from_io(path, e))?;
        Ok(ItemValue::Uint(stat.size))
    }

    fn contents(&self, params: &[String]) -> Result<ItemValue, AgentError> {
        let path = single_param(params)?;
        let stat = self
            .fs
            .stat(Path::new(path))
            .map_err(|e| AgentError::from_io(path, e))?;
        if stat.kind != FileKind::File {
            return Err(AgentError::io(
                path,
                io::Error::new(io::ErrorKind::InvalidData, "not a regular file"),
            ));
        }

        // The size can change between stat and read, so the limit is
        // enforced on what was actually read.
        let bytes = self
            .fs
            .read(Path::new(path), MAX_CONTENTS_SIZE + 1)
            .map_err(|e| AgentError::from_io(path, e))?;
        if bytes.len() as u64 > MAX_CONTENTS_SIZE {
            return Err(AgentError::io(
                path,
                io::Error::new(
                    io::ErrorKind::FileTooLarge,
                    format!(
                        "file is too large, maximum allowed size is {} bytes",
                        MAX_CONTENTS_SIZE
                    ),
                ),
            ));
        }

        let text = String::from_utf8_lossy(&bytes);
        Ok(ItemValue::Text(
            text.trim_end_matches(['\r', '\n']).to_string(),
        ))
    }
}

impl<F: FileSystem> Plugin for VfsFilePlugin<F> {
    fn name(&self) -> &str {
        "vfs.file"
    }

    fn metrics(&self) -> &[Metric] {
        METRICS
    }

    fn export(
        &self,
        key: &str,
        params: &[String],
        _ctx: Option<&ExecContext>,
    ) -> Result<ItemValue, AgentError> {
        match key {
            "vfs.file.exists" => self.exists(params),
            "vfs.file.size" => self.size(params),
            "vfs.file.contents" => self.contents(params),
            _ => Err(AgentError::UnsupportedKey(key.to_string())),
        }
    }
}
