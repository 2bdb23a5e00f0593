//! Test doubles for the [`FileSystem`](super::FileSystem) trait.

mod faults;
mod filesystem;

pub use faults::FaultyFs;
pub use filesystem::MockFs;
