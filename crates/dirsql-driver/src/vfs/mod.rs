//! File-store access layer.
//!
//! The traversal engine and path resolver never touch `std::fs` directly;
//! they go through [`VfsOps`], which keeps the store swappable:
//!
//! - [`LocalBackend`] - the host file system
//! - [`MemoryBackend`] - an in-memory tree (tests, embedding)
//!
//! ## Design Decisions
//!
//! - **Absolute physical paths**: backends are addressed by the physical
//!   locations stored in the namespace registry. Confinement to a root is
//!   the resolver's job, not the backend's.
//! - **Synchronous**: every call runs to completion on the caller's thread.
//! - **Sorted listings**: `readdir` returns entries in ordinal name order so
//!   every consumer sees the same enumeration order.

pub mod backends;
mod error;
mod ops;
mod types;

pub use backends::{LocalBackend, MemoryBackend};
pub use error::{VfsError, VfsResult};
pub use ops::VfsOps;
pub use types::{DirEntry, FileAttr, FileType};
