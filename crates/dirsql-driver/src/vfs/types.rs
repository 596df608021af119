//! Core VFS types.

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::time::SystemTime;

/// File type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileType {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link whose target could not be followed.
    Symlink,
}

impl FileType {
    pub fn is_file(&self) -> bool {
        matches!(self, FileType::File)
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, FileType::Directory)
    }

    pub fn is_symlink(&self) -> bool {
        matches!(self, FileType::Symlink)
    }
}

/// File attributes (the subset the driver reports).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAttr {
    /// Size in bytes.
    pub size: u64,
    /// File type.
    pub kind: FileType,
    /// Last modification time.
    pub mtime: SystemTime,
}

impl FileAttr {
    pub fn file(size: u64, mtime: SystemTime) -> Self {
        Self {
            size,
            kind: FileType::File,
            mtime,
        }
    }

    pub fn directory(mtime: SystemTime) -> Self {
        Self {
            size: 0,
            kind: FileType::Directory,
            mtime,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }

    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }
}

/// Directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    /// Entry name for display; lossy when the stored name is not UTF-8.
    pub name: String,
    /// Name as stored. Physical paths are built from this one.
    pub raw_name: OsString,
    /// Entry type.
    pub kind: FileType,
}

impl DirEntry {
    pub fn new(raw_name: impl Into<OsString>, kind: FileType) -> Self {
        let raw_name = raw_name.into();
        Self {
            name: raw_name.to_string_lossy().into_owned(),
            raw_name,
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_type() {
        assert!(FileType::File.is_file());
        assert!(!FileType::File.is_dir());
        assert!(FileType::Directory.is_dir());
        assert!(FileType::Symlink.is_symlink());
    }

    #[test]
    fn test_attr_constructors() {
        let now = SystemTime::now();
        let file = FileAttr::file(1024, now);
        assert!(file.is_file());
        assert_eq!(file.size, 1024);

        let dir = FileAttr::directory(now);
        assert!(dir.is_dir());
        assert_eq!(dir.size, 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_dir_entry_keeps_raw_name() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let entry = DirEntry::new(OsStr::from_bytes(b"bad\xff.txt"), FileType::File);
        assert_eq!(entry.name, "bad\u{fffd}.txt");
        assert_eq!(entry.raw_name.as_bytes(), b"bad\xff.txt");
    }
}
