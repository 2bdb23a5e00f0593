//! Operating-system abstraction used by item plugins.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │          Registry / Plugin::export       │
//! └────────────────────┬─────────────────────┘
//!                      │
//!               ┌──────▼──────┐
//!               │  FileSystem │ (trait)
//!               └──────┬──────┘
//!                      │
//!      ┌───────────────┼───────────────┐
//!      │               │               │
//! ┌────▼────┐     ┌────▼────┐     ┌────▼─────┐
//! │ RealFs  │     │ MockFs  │     │ FaultyFs │
//! │ (std)   │     │ (tests) │     │ (faults) │
//! └─────────┘     └─────────┘     └──────────┘
//! ```
//!
//! The filesystem is injected into each plugin when it is constructed;
//! there is no process-wide binding to swap.
//!
//! ```
//! use agentplug_core::os::MockFs;
//! use agentplug_core::plugin::{ItemValue, Plugin};
//! use agentplug_core::plugins::VfsFilePlugin;
//!
//! let fs = MockFs::new().with_file("text.txt", "1234");
//! let plugin = VfsFilePlugin::new(fs);
//! let params = vec!["text.txt".to_string()];
//! let value = plugin.export("vfs.file.exists", &params, None).unwrap();
//! assert_eq!(value, ItemValue::Uint(1));
//! ```

pub mod mock;
pub mod traits;

pub use mock::{FaultyFs, MockFs};
pub use traits::{FileKind, FileStat, FileSystem, RealFs};
