//! Local filesystem backend.
//!
//! Reads real host paths. Confinement to a virtual root is enforced by the
//! resolver through [`VfsOps::canonicalize`], which this backend implements
//! with `dunce` so Windows paths come back without the `\\?\` prefix.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::vfs::error::{VfsError, VfsResult};
use crate::vfs::ops::VfsOps;
use crate::vfs::types::{DirEntry, FileAttr, FileType};

/// Host filesystem backend.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    case_sensitive: bool,
}

impl Default for LocalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalBackend {
    /// Create a backend using the host platform's name case sensitivity.
    pub fn new() -> Self {
        Self {
            case_sensitive: !cfg!(any(windows, target_os = "macos")),
        }
    }

    /// Override case sensitivity (for case-folding volumes on Linux, etc.).
    pub fn with_case_sensitivity(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Convert std::fs::Metadata to FileAttr.
    fn metadata_to_attr(meta: &fs::Metadata) -> FileAttr {
        let kind = if meta.is_dir() {
            FileType::Directory
        } else if meta.file_type().is_symlink() {
            FileType::Symlink
        } else {
            FileType::File
        };

        FileAttr {
            size: if kind.is_dir() { 0 } else { meta.len() },
            kind,
            mtime: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
        }
    }
}

impl VfsOps for LocalBackend {
    fn getattr(&self, path: &Path) -> VfsResult<FileAttr> {
        // Follow links; a dangling link still has attributes of its own.
        let meta = fs::metadata(path)
            .or_else(|_| fs::symlink_metadata(path))
            .map_err(|e| VfsError::from_io(e, path))?;
        Ok(Self::metadata_to_attr(&meta))
    }

    fn readdir(&self, path: &Path) -> VfsResult<Vec<DirEntry>> {
        let mut entries = Vec::new();
        let dir = fs::read_dir(path).map_err(|e| VfsError::from_io(e, path))?;

        for entry in dir {
            let entry = entry.map_err(|e| VfsError::from_io(e, path))?;
            let file_type = entry.file_type().map_err(|e| VfsError::from_io(e, path))?;
            // Links are reported as links; callers decide whether to follow.
            let kind = if file_type.is_symlink() {
                FileType::Symlink
            } else if file_type.is_dir() {
                FileType::Directory
            } else {
                FileType::File
            };

            entries.push(DirEntry::new(entry.file_name(), kind));
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn read_all(&self, path: &Path) -> VfsResult<Vec<u8>> {
        fs::read(path).map_err(|e| VfsError::from_io(e, path))
    }

    fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    fn canonicalize(&self, path: &Path) -> VfsResult<PathBuf> {
        dunce::canonicalize(path).map_err(|e| VfsError::from_io(e, path))
    }
}
