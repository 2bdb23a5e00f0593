//! agentplug-core — item execution framework for the monitoring agent.
//!
//! Provides:
//! - `os` — filesystem abstraction with real and in-memory implementations
//! - `plugin` — plugin contract, item key parser and the key registry
//! - `plugins` — built-in plugins (`vfs.file.*`)
//! - `error` — error type shared by all of the above

pub mod error;
pub mod os;
pub mod plugin;
pub mod plugins;

pub use error::{AgentError, ErrorKind};
