//! Built-in item plugins.

pub mod vfs_file;

pub use vfs_file::VfsFilePlugin;
