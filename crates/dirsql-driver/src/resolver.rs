//! Catalog paths and their resolution to physical locations.
//!
//! A catalog path is a logical, root-qualified string such as
//! `docs/reports/2024`. Its first segment names a [`VirtualRoot`]; the rest
//! is relative to that root's physical location.
//!
//! The logical separator is always `/` (the host separator is also accepted
//! on input). Echoed paths keep `/`; only the physical join uses the host
//! separator.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dirsql_types::{Identity, Permissions};

use crate::error::{DriverError, DriverResult};
use crate::registry::{SharedRegistry, VirtualRoot};
use crate::vfs::VfsOps;

/// Normalized logical path: root segment plus relative segments.
///
/// `.` and empty segments are dropped; `..` never climbs above the root
/// segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CatalogPath {
    segments: Vec<String>,
}

fn is_separator(c: char) -> bool {
    c == '/' || c == std::path::MAIN_SEPARATOR
}

impl CatalogPath {
    pub fn parse(text: &str) -> DriverResult<Self> {
        let mut segments: Vec<String> = Vec::new();
        for segment in text.split(is_separator) {
            match segment {
                "" | "." => {}
                ".." => {
                    if segments.len() > 1 {
                        segments.pop();
                    }
                }
                s => segments.push(s.to_string()),
            }
        }
        if segments.is_empty() {
            return Err(DriverError::malformed(format!(
                "catalog path '{}' names no root",
                text
            )));
        }
        Ok(Self { segments })
    }

    /// A path consisting of just a root name.
    pub fn root_only(name: impl Into<String>) -> Self {
        Self {
            segments: vec![name.into()],
        }
    }

    /// The enclosing path, or `None` for a bare root.
    pub fn parent(&self) -> Option<CatalogPath> {
        (self.segments.len() > 1).then(|| Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// The highest-level segment: walk up through parents until none remain.
    pub fn root(&self) -> &str {
        &self.segments[0]
    }

    /// Segments below the root.
    pub fn relative_segments(&self) -> &[String] {
        &self.segments[1..]
    }

    /// Relative part as a host path.
    pub fn relative_path(&self) -> PathBuf {
        self.relative_segments().iter().collect()
    }

    /// Last segment (the root name for a bare root).
    pub fn name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    pub fn join(&self, name: &str) -> CatalogPath {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Self { segments }
    }
}

impl std::fmt::Display for CatalogPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

/// Outcome of resolving a catalog path.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub root: Arc<VirtualRoot>,
    pub catalog: CatalogPath,
    /// Root location joined with the relative path.
    pub physical: PathBuf,
    /// Relative path with host separators.
    pub relative: PathBuf,
    /// Canonical root location. Nothing found below `physical` may resolve
    /// outside it.
    pub confine: PathBuf,
}

/// Resolves catalog paths through the registry, enforcing authorization.
#[derive(Clone)]
pub struct PathResolver {
    registry: SharedRegistry,
    fs: Arc<dyn VfsOps>,
}

impl std::fmt::Debug for PathResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathResolver")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl PathResolver {
    pub fn new(registry: SharedRegistry, fs: Arc<dyn VfsOps>) -> Self {
        Self { registry, fs }
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    /// Resolve a catalog string for `identity`, requiring `required` bits.
    pub fn resolve(
        &self,
        path: &str,
        identity: &Identity,
        required: Permissions,
    ) -> DriverResult<Resolved> {
        let catalog = CatalogPath::parse(path)?;
        self.resolve_catalog(catalog, identity, required)
    }

    /// Resolve an already-parsed catalog path.
    pub fn resolve_catalog(
        &self,
        catalog: CatalogPath,
        identity: &Identity,
        required: Permissions,
    ) -> DriverResult<Resolved> {
        // The registry hands back an Arc; no lock is held past this point.
        let root = self
            .registry
            .lookup(catalog.root())
            .ok_or_else(|| DriverError::unknown_root(catalog.root()))?;

        if !root.authorize(identity, required) {
            tracing::debug!(path = %catalog, %identity, %required, "authorization denied");
            return Err(DriverError::authorization(catalog.to_string(), identity));
        }

        let relative = catalog.relative_path();
        let physical = if relative.as_os_str().is_empty() {
            root.location().to_path_buf()
        } else {
            root.location().join(&relative)
        };
        let confine = self
            .fs
            .canonicalize(root.location())
            .unwrap_or_else(|_| root.location().to_path_buf());
        if physical.as_os_str() != root.location().as_os_str() {
            self.check_confined(&confine, &physical)?;
        }

        Ok(Resolved {
            root,
            catalog,
            physical,
            relative,
            confine,
        })
    }

    /// Reject existing targets whose canonical form leaves the root (links).
    fn check_confined(&self, canonical_root: &Path, physical: &Path) -> DriverResult<()> {
        let Ok(canonical) = self.fs.canonicalize(physical) else {
            // Absent targets are resolved lexically; enumeration yields zero rows.
            return Ok(());
        };
        if canonical.starts_with(canonical_root) {
            Ok(())
        } else {
            Err(DriverError::PathEscapesRoot(format!(
                "{} is not under {}",
                canonical.display(),
                canonical_root.display()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{AllowAll, Grant, NamespaceRegistry};
    use crate::vfs::MemoryBackend;

    fn resolver() -> PathResolver {
        let registry = NamespaceRegistry::shared();
        registry
            .register(VirtualRoot::new("docs", "/srv/docs", AllowAll))
            .unwrap();
        registry
            .register(VirtualRoot::new("locked", "/srv/locked", Grant(Permissions::LIST)))
            .unwrap();
        let fs = MemoryBackend::new();
        fs.add_file("/srv/docs/a.xml", "<a/>");
        fs.add_file("/srv/outside.txt", "x");
        PathResolver::new(registry, Arc::new(fs))
    }

    #[test]
    fn test_parse_normalizes() {
        let path = CatalogPath::parse("/docs//sub/./deeper/").unwrap();
        assert_eq!(path.to_string(), "docs/sub/deeper");
        assert_eq!(path.root(), "docs");
        assert_eq!(path.relative_segments(), ["sub", "deeper"]);
        assert_eq!(path.name(), "deeper");
    }

    #[test]
    fn test_parse_clamps_parent_segments() {
        assert_eq!(CatalogPath::parse("docs/../../etc").unwrap().to_string(), "docs/etc");
        assert_eq!(CatalogPath::parse("docs/a/../b").unwrap().to_string(), "docs/b");
        assert!(CatalogPath::parse("").is_err());
        assert!(CatalogPath::parse("/./").is_err());
    }

    #[test]
    fn test_parent_walks_to_root() {
        let mut path = CatalogPath::parse("docs/a/b").unwrap();
        while let Some(parent) = path.parent() {
            path = parent;
        }
        assert_eq!(path, CatalogPath::root_only("docs"));
    }

    #[test]
    fn test_resolve_joins_location() {
        let resolved = resolver()
            .resolve("docs/sub/x", &Identity::anonymous(), Permissions::READ)
            .unwrap();
        assert_eq!(resolved.physical, Path::new("/srv/docs").join("sub").join("x"));
        assert_eq!(resolved.relative, Path::new("sub").join("x"));
        assert_eq!(resolved.catalog.to_string(), "docs/sub/x");
    }

    #[test]
    fn test_resolve_never_escapes_root() {
        let resolver = resolver();
        for input in ["docs/..", "docs/../outside.txt", "docs/a/../../..", "docs/../../srv"] {
            let resolved = resolver
                .resolve(input, &Identity::anonymous(), Permissions::READ)
                .unwrap();
            assert!(
                resolved.physical.starts_with("/srv/docs"),
                "{input} resolved to {}",
                resolved.physical.display()
            );
        }
    }

    #[test]
    fn test_unknown_root() {
        let err = resolver()
            .resolve("nope/a", &Identity::anonymous(), Permissions::READ)
            .unwrap_err();
        assert!(matches!(err, DriverError::UnknownRoot(ref n) if n == "nope"));
    }

    #[test]
    fn test_authorization_is_distinct_from_not_found() {
        let err = resolver()
            .resolve("locked/a", &Identity::new("amy"), Permissions::READ)
            .unwrap_err();
        match err {
            DriverError::Authorization { path, identity } => {
                assert_eq!(path, "locked/a");
                assert_eq!(identity, Identity::new("amy"));
            }
            other => panic!("expected authorization error, got {other:?}"),
        }

        // LIST alone is granted.
        assert!(resolver()
            .resolve("locked", &Identity::new("amy"), Permissions::LIST)
            .is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_rejected() {
        use crate::vfs::LocalBackend;

        let outside = tempfile::TempDir::new().unwrap();
        let inside = tempfile::TempDir::new().unwrap();
        std::os::unix::fs::symlink(outside.path(), inside.path().join("link")).unwrap();

        let registry = NamespaceRegistry::shared();
        registry
            .register(VirtualRoot::new("r", inside.path(), AllowAll))
            .unwrap();
        let resolver = PathResolver::new(registry, Arc::new(LocalBackend::new()));
        let err = resolver
            .resolve("r/link", &Identity::anonymous(), Permissions::READ)
            .unwrap_err();
        assert!(matches!(err, DriverError::PathEscapesRoot(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_recursive_walk_skips_links_leaving_root() {
        use crate::flavor::Flavor;
        use crate::traversal::{TraversalEngine, TraversalOptions, TraversalSource};
        use crate::vfs::LocalBackend;
        use crate::xml::ElementPathExtractor;
        use std::os::unix::fs::symlink;

        let outside = tempfile::TempDir::new().unwrap();
        std::fs::write(outside.path().join("secret.txt"), b"s").unwrap();
        let inside = tempfile::TempDir::new().unwrap();
        std::fs::write(inside.path().join("a.txt"), b"a").unwrap();
        std::fs::create_dir(inside.path().join("sub")).unwrap();
        std::fs::write(inside.path().join("sub").join("b.txt"), b"b").unwrap();
        symlink(outside.path(), inside.path().join("link")).unwrap();
        symlink(outside.path().join("secret.txt"), inside.path().join("secret-link")).unwrap();
        symlink(inside.path().join("sub"), inside.path().join("within")).unwrap();

        let registry = NamespaceRegistry::shared();
        registry
            .register(VirtualRoot::new("r", inside.path(), AllowAll))
            .unwrap();
        let fs: Arc<dyn VfsOps> = Arc::new(LocalBackend::new());
        let resolved = PathResolver::new(registry, fs.clone())
            .resolve("r", &Identity::anonymous(), Permissions::READ)
            .unwrap();
        let source = TraversalSource {
            catalog: resolved.catalog,
            physical: resolved.physical,
            recursive: true,
            confine: resolved.confine,
        };

        let engine = TraversalEngine::new(fs, Arc::new(ElementPathExtractor));
        let names: Vec<String> = engine
            .enumerate(&[source], &TraversalOptions::new(Flavor::FileBacked))
            .unwrap()
            .into_result()
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, ["a.txt", "sub", "within", "b.txt", "b.txt"]);
    }
}
