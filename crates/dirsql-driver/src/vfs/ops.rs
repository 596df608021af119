//! VFS operations trait.

use std::path::{Path, PathBuf};

use super::types::{DirEntry, FileAttr};
use super::VfsResult;

/// Read-only store operations used by the driver.
///
/// All paths are absolute physical locations.
pub trait VfsOps: Send + Sync {
    /// Get attributes, following symbolic links.
    fn getattr(&self, path: &Path) -> VfsResult<FileAttr>;

    /// Read directory entries, sorted by ordinal name comparison.
    fn readdir(&self, path: &Path) -> VfsResult<Vec<DirEntry>>;

    /// Read entire file contents.
    fn read_all(&self, path: &Path) -> VfsResult<Vec<u8>>;

    /// Whether names in this store compare case-sensitively.
    fn case_sensitive(&self) -> bool;

    /// Resolve links and relative components of an existing path.
    ///
    /// Stores without links return the path unchanged.
    fn canonicalize(&self, path: &Path) -> VfsResult<PathBuf> {
        Ok(path.to_path_buf())
    }

    /// Check if a path exists.
    fn exists(&self, path: &Path) -> bool {
        self.getattr(path).is_ok()
    }

    /// Check if a path exists and is a directory.
    fn is_dir(&self, path: &Path) -> bool {
        self.getattr(path).map(|a| a.is_dir()).unwrap_or(false)
    }
}
