//! Error type shared by the OS abstraction, plugins and the registry.

use std::io;
use std::path::PathBuf;

/// Coarse classification of an [`AgentError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing, empty, extra or malformed input.
    InvalidArgument,
    /// The item key is not served by the plugin or registry.
    UnsupportedKey,
    /// The OS could not answer for a reason other than absence.
    IoFailure,
}

/// Errors returned by item evaluation.
///
/// "File does not exist" is never an error: existence checks report it
/// as a successful `0`.
#[derive(Debug)]
pub enum AgentError {
    /// Bad parameters or a malformed item key.
    InvalidArgument(String),
    /// Key not recognized.
    UnsupportedKey(String),
    /// A key is already served by another registered plugin.
    DuplicateKey { key: String, plugin: String },
    /// Underlying filesystem failure.
    Io { path: PathBuf, source: io::Error },
}

impl AgentError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        AgentError::InvalidArgument(msg.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        AgentError::Io {
            path: path.into(),
            source,
        }
    }

    /// Wraps an I/O error for `path`, treating a malformed path (interior
    /// NUL and the like) as a bad argument rather than an OS failure.
    pub fn from_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::InvalidInput {
            AgentError::InvalidArgument(format!("malformed path {:?}: {}", path, source))
        } else {
            AgentError::io(path, source)
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AgentError::InvalidArgument(_) | AgentError::DuplicateKey { .. } => {
                ErrorKind::InvalidArgument
            }
            AgentError::UnsupportedKey(_) => ErrorKind::UnsupportedKey,
            AgentError::Io { .. } => ErrorKind::IoFailure,
        }
    }
}

impl std::fmt::Display for AgentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentError::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            AgentError::UnsupportedKey(key) => write!(f, "unsupported item key: {}", key),
            AgentError::DuplicateKey { key, plugin } => {
                write!(f, "item key {} is already provided by plugin {}", key, plugin)
            }
            AgentError::Io { path, source } => {
                write!(f, "cannot access {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for AgentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AgentError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
