//! In-memory filesystem backend.
//!
//! Used for testing and embedding. Entries are keyed by absolute path and
//! carry explicit modification times, so results built over a memory tree
//! are fully deterministic.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use parking_lot::RwLock;

use crate::vfs::error::{VfsError, VfsResult};
use crate::vfs::ops::VfsOps;
use crate::vfs::types::{DirEntry, FileAttr, FileType};

/// Entry in the memory filesystem.
#[derive(Debug, Clone)]
enum Entry {
    File { data: Vec<u8>, mtime: SystemTime },
    Directory { mtime: SystemTime },
}

impl Entry {
    fn attr(&self) -> FileAttr {
        match self {
            Entry::File { data, mtime } => FileAttr::file(data.len() as u64, *mtime),
            Entry::Directory { mtime } => FileAttr::directory(*mtime),
        }
    }

    fn kind(&self) -> FileType {
        match self {
            Entry::File { .. } => FileType::File,
            Entry::Directory { .. } => FileType::Directory,
        }
    }
}

/// In-memory filesystem backend.
///
/// Thread-safe via internal `RwLock`. All data is lost when dropped.
#[derive(Debug)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<PathBuf, Entry>>,
    case_sensitive: bool,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// Create an empty, case-sensitive store containing only `/`.
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        entries.insert(
            PathBuf::from("/"),
            Entry::Directory {
                mtime: SystemTime::UNIX_EPOCH,
            },
        );
        Self {
            entries: RwLock::new(entries),
            case_sensitive: true,
        }
    }

    /// Report names as case-insensitive (pattern matching only; lookups stay exact).
    pub fn case_insensitive(mut self) -> Self {
        self.case_sensitive = false;
        self
    }

    /// Normalize a path: anchor at `/`, resolve `.` and `..` (never above `/`).
    fn normalize(path: &Path) -> PathBuf {
        let mut result = PathBuf::from("/");
        for component in path.components() {
            match component {
                Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
                Component::ParentDir => {
                    result.pop();
                }
                Component::Normal(s) => result.push(s),
            }
        }
        result
    }

    /// Ensure all ancestors of `path` exist as directories.
    fn ensure_parents(entries: &mut HashMap<PathBuf, Entry>, path: &Path, mtime: SystemTime) {
        let mut current = PathBuf::from("/");
        if let Some(parent) = path.parent() {
            for component in parent.components() {
                if let Component::Normal(s) = component {
                    current.push(s);
                    entries
                        .entry(current.clone())
                        .or_insert(Entry::Directory { mtime });
                }
            }
        }
    }

    /// Add (or replace) a file, creating parent directories.
    pub fn add_file(&self, path: impl AsRef<Path>, data: impl Into<Vec<u8>>) {
        self.add_file_with_mtime(path, data, SystemTime::UNIX_EPOCH);
    }

    /// Add (or replace) a file with an explicit modification time.
    pub fn add_file_with_mtime(
        &self,
        path: impl AsRef<Path>,
        data: impl Into<Vec<u8>>,
        mtime: SystemTime,
    ) {
        let path = Self::normalize(path.as_ref());
        let mut entries = self.entries.write();
        Self::ensure_parents(&mut entries, &path, SystemTime::UNIX_EPOCH);
        entries.insert(
            path,
            Entry::File {
                data: data.into(),
                mtime,
            },
        );
    }

    /// Add a directory (and its parents).
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = Self::normalize(path.as_ref());
        let mut entries = self.entries.write();
        Self::ensure_parents(&mut entries, &path, SystemTime::UNIX_EPOCH);
        entries.entry(path).or_insert(Entry::Directory {
            mtime: SystemTime::UNIX_EPOCH,
        });
    }

    /// Remove an entry and everything below it. Returns true if anything was removed.
    pub fn remove(&self, path: impl AsRef<Path>) -> bool {
        let path = Self::normalize(path.as_ref());
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|p, _| !p.starts_with(&path) || p == Path::new("/"));
        entries.len() != before
    }

    fn path_str(path: &Path) -> String {
        path.display().to_string()
    }
}

impl VfsOps for MemoryBackend {
    fn getattr(&self, path: &Path) -> VfsResult<FileAttr> {
        let normalized = Self::normalize(path);
        self.entries
            .read()
            .get(&normalized)
            .map(Entry::attr)
            .ok_or_else(|| VfsError::not_found(Self::path_str(&normalized)))
    }

    fn readdir(&self, path: &Path) -> VfsResult<Vec<DirEntry>> {
        let normalized = Self::normalize(path);
        let entries = self.entries.read();

        match entries.get(&normalized) {
            Some(Entry::Directory { .. }) => {}
            Some(_) => return Err(VfsError::not_a_directory(Self::path_str(&normalized))),
            None => return Err(VfsError::not_found(Self::path_str(&normalized))),
        }

        let mut result: Vec<DirEntry> = entries
            .iter()
            .filter(|(p, _)| p.parent() == Some(normalized.as_path()))
            .filter_map(|(p, e)| {
                p.file_name()
                    .map(|n| DirEntry::new(n, e.kind()))
            })
            .collect();

        // Sort for consistent ordering
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }

    fn read_all(&self, path: &Path) -> VfsResult<Vec<u8>> {
        let normalized = Self::normalize(path);
        match self.entries.read().get(&normalized) {
            Some(Entry::File { data, .. }) => Ok(data.clone()),
            Some(Entry::Directory { .. }) => {
                Err(VfsError::is_a_directory(Self::path_str(&normalized)))
            }
            None => Err(VfsError::not_found(Self::path_str(&normalized))),
        }
    }

    fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    fn canonicalize(&self, path: &Path) -> VfsResult<PathBuf> {
        let normalized = Self::normalize(path);
        if self.entries.read().contains_key(&normalized) {
            Ok(normalized)
        } else {
            Err(VfsError::not_found(Self::path_str(&normalized)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_add_file_creates_parents() {
        let fs = MemoryBackend::new();
        fs.add_file("/srv/docs/sub/c.xml", "<c/>");

        assert!(fs.is_dir(Path::new("/srv")));
        assert!(fs.is_dir(Path::new("/srv/docs/sub")));
        let attr = fs.getattr(Path::new("/srv/docs/sub/c.xml")).unwrap();
        assert!(attr.is_file());
        assert_eq!(attr.size, 4);
    }

    #[test]
    fn test_readdir_direct_children_sorted() {
        let fs = MemoryBackend::new();
        fs.add_file("/d/b.txt", "b");
        fs.add_file("/d/a.xml", "a");
        fs.add_file("/d/sub/c.xml", "c");

        let entries = fs.readdir(Path::new("/d")).unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.xml", "b.txt", "sub"]);
        assert!(entries[2].kind.is_dir());
    }

    #[test]
    fn test_readdir_errors() {
        let fs = MemoryBackend::new();
        fs.add_file("/d/a.txt", "a");
        assert!(matches!(
            fs.readdir(Path::new("/d/a.txt")),
            Err(VfsError::NotADirectory(_))
        ));
        assert!(matches!(
            fs.readdir(Path::new("/missing")),
            Err(VfsError::NotFound(_))
        ));
    }

    #[test]
    fn test_mtime_preserved() {
        let fs = MemoryBackend::new();
        let when = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        fs.add_file_with_mtime("/d/a.txt", "a", when);
        assert_eq!(fs.getattr(Path::new("/d/a.txt")).unwrap().mtime, when);
    }

    #[test]
    fn test_remove_subtree() {
        let fs = MemoryBackend::new();
        fs.add_file("/d/sub/a.txt", "a");
        assert!(fs.remove("/d/sub"));
        assert!(!fs.exists(Path::new("/d/sub/a.txt")));
        assert!(fs.exists(Path::new("/d")));
    }

    #[test]
    fn test_normalize_clamps_parent() {
        let fs = MemoryBackend::new();
        fs.add_file("/d/a.txt", "a");
        assert!(fs.exists(Path::new("/../../d/./a.txt")));
    }
}
