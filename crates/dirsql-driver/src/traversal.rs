//! Traversal engine.
//!
//! Walks resolved physical locations through [`VfsOps`] and yields one
//! [`EntryRecord`] per matching entry. Ordering is deterministic:
//!
//! - sources are enumerated in the order given;
//! - within a directory, entries are emitted in ordinal name order;
//! - a recursive walk emits a directory's own entries before descending
//!   into its subdirectories, which are visited in the same order.
//!
//! Links are followed only while their target stays under the source's
//! canonical root; a link leading elsewhere is neither listed nor walked.
//!
//! A source that does not exist (or is not a directory) contributes zero
//! rows. Any other read failure stops that source and is recorded in the
//! [`Enumeration`]; the remaining sources still run.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use dirsql_types::Value;
use tokio_util::sync::CancellationToken;

use crate::error::{DriverError, DriverResult};
use crate::filter::RowFilter;
use crate::flavor::{Flavor, TableType};
use crate::pattern::NamePattern;
use crate::plan::{FileColumn, PlanColumn};
use crate::resolver::CatalogPath;
use crate::vfs::{FileAttr, FileType, VfsError, VfsOps};
use crate::xml::{FieldExtractor, XmlField};

/// Render a modification time as `yyyy-MM-dd HH:mm:ss:SSnn` (UTC).
///
/// The four digits after the last colon are the leading fractional-second
/// digits, so the text sorts lexically in time order.
pub fn format_modified(time: SystemTime) -> String {
    let dt: DateTime<Utc> = time.into();
    format!(
        "{}{:04}",
        dt.format("%Y-%m-%d %H:%M:%S:"),
        dt.timestamp_subsec_nanos() / 100_000
    )
}

/// One location to walk.
#[derive(Debug, Clone)]
pub struct TraversalSource {
    /// Catalog path as the caller wrote it (normalized).
    pub catalog: CatalogPath,
    pub physical: PathBuf,
    pub recursive: bool,
    /// Canonical location of the owning root.
    pub confine: PathBuf,
}

/// Which entry kinds produce records. Directories are always descended
/// into when recursing, whether or not they are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryKinds {
    pub files: bool,
    pub directories: bool,
}

impl EntryKinds {
    pub const ALL: EntryKinds = EntryKinds {
        files: true,
        directories: true,
    };

    fn admits(&self, table_type: TableType) -> bool {
        if table_type.is_directory() {
            self.directories
        } else {
            self.files
        }
    }
}

/// Knobs for one enumeration.
#[derive(Debug, Clone)]
pub struct TraversalOptions {
    pub flavor: Flavor,
    pub kinds: EntryKinds,
    /// Applied to the entry's base name before anything is read.
    pub name_filter: Option<NamePattern>,
    pub row_filter: Option<RowFilter>,
    /// Read documents and attach their fields.
    pub extract_fields: bool,
    pub cancel: CancellationToken,
}

impl TraversalOptions {
    pub fn new(flavor: Flavor) -> Self {
        Self {
            flavor,
            kinds: EntryKinds::ALL,
            name_filter: None,
            row_filter: None,
            extract_fields: false,
            cancel: CancellationToken::new(),
        }
    }
}

/// One enumerated entry.
#[derive(Debug, Clone)]
pub struct EntryRecord {
    /// Enclosing directory as the caller knows it.
    pub parent: CatalogPath,
    pub name: String,
    pub physical: PathBuf,
    pub table_type: TableType,
    pub attr: FileAttr,
    pub fields: Option<Vec<XmlField>>,
}

impl EntryRecord {
    /// Catalog path of the entry itself.
    pub fn catalog(&self) -> CatalogPath {
        self.parent.join(&self.name)
    }

    pub fn value(&self, column: &PlanColumn) -> Value {
        match column {
            PlanColumn::File(FileColumn::Path) => Value::Text(self.parent.to_string()),
            PlanColumn::File(FileColumn::Name) => Value::Text(self.name.clone()),
            PlanColumn::File(FileColumn::FullName) => {
                Value::Text(self.physical.display().to_string())
            }
            PlanColumn::File(FileColumn::Modified) => Value::Text(format_modified(self.attr.mtime)),
            PlanColumn::File(FileColumn::Length) => {
                let length = if self.attr.is_dir() { 0 } else { self.attr.size };
                Value::Integer(i64::try_from(length).unwrap_or(i64::MAX))
            }
            PlanColumn::File(FileColumn::Contents) => Value::Null,
            PlanColumn::Field(path) => self
                .fields
                .as_ref()
                .and_then(|fields| fields.iter().find(|f| &f.path == path))
                .and_then(|f| f.text.clone())
                .into(),
        }
    }
}

/// A source that stopped early.
#[derive(Debug)]
pub struct TraversalFailure {
    /// Index into the sources passed to [`TraversalEngine::enumerate`].
    pub source: usize,
    pub path: PathBuf,
    pub error: VfsError,
}

/// Result of walking a set of sources.
#[derive(Debug, Default)]
pub struct Enumeration {
    pub entries: Vec<EntryRecord>,
    pub failures: Vec<TraversalFailure>,
    /// Every field path seen in a visited document, matched or not.
    pub field_paths: BTreeSet<String>,
}

impl Enumeration {
    /// Turn the first recorded failure into an error.
    pub fn into_result(mut self) -> DriverResult<Vec<EntryRecord>> {
        if self.failures.is_empty() {
            Ok(self.entries)
        } else {
            let failure = self.failures.swap_remove(0);
            Err(DriverError::io(failure.path, failure.error))
        }
    }
}

enum Stop {
    Cancelled,
    Failed(PathBuf, VfsError),
}

/// Walks physical locations through a [`VfsOps`] store.
#[derive(Clone)]
pub struct TraversalEngine {
    fs: Arc<dyn VfsOps>,
    extractor: Arc<dyn FieldExtractor>,
}

impl std::fmt::Debug for TraversalEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraversalEngine")
            .field("case_sensitive", &self.fs.case_sensitive())
            .finish_non_exhaustive()
    }
}

impl TraversalEngine {
    pub fn new(fs: Arc<dyn VfsOps>, extractor: Arc<dyn FieldExtractor>) -> Self {
        Self { fs, extractor }
    }

    pub fn fs(&self) -> &Arc<dyn VfsOps> {
        &self.fs
    }

    pub fn case_sensitive(&self) -> bool {
        self.fs.case_sensitive()
    }

    /// Walk every source in order.
    ///
    /// Fails only on cancellation; read failures are reported in the
    /// returned [`Enumeration`].
    #[tracing::instrument(skip(self, sources, options), name = "engine.enumerate", fields(sources = sources.len()))]
    pub fn enumerate(
        &self,
        sources: &[TraversalSource],
        options: &TraversalOptions,
    ) -> DriverResult<Enumeration> {
        let mut out = Enumeration::default();
        for (index, source) in sources.iter().enumerate() {
            let walked = self.walk(
                &source.physical,
                &source.catalog,
                &source.confine,
                source.recursive,
                true,
                options,
                &mut out,
            );
            match walked {
                Ok(()) => {}
                Err(Stop::Cancelled) => return Err(DriverError::Cancelled),
                Err(Stop::Failed(path, error)) => {
                    tracing::warn!(source = %source.catalog, path = %path.display(), %error, "traversal failed");
                    out.failures.push(TraversalFailure {
                        source: index,
                        path,
                        error,
                    });
                }
            }
        }
        tracing::debug!(
            entries = out.entries.len(),
            failures = out.failures.len(),
            "enumeration finished"
        );
        Ok(out)
    }

    /// Describe a single entry without listing its parent.
    pub fn stat(
        &self,
        parent: &CatalogPath,
        physical_parent: &Path,
        name: &str,
        flavor: Flavor,
    ) -> DriverResult<Option<EntryRecord>> {
        let physical = physical_parent.join(name);
        let attr = match self.fs.getattr(&physical) {
            Ok(attr) => attr,
            Err(e) if e.is_absent() => return Ok(None),
            Err(e) => return Err(DriverError::io(physical, e)),
        };
        let Some(table_type) = flavor.classify(name, attr.kind) else {
            return Ok(None);
        };
        Ok(Some(EntryRecord {
            parent: parent.clone(),
            name: name.to_string(),
            physical,
            table_type,
            attr,
            fields: None,
        }))
    }

    /// Fields of one document; extraction failures read as "no fields".
    pub fn fields_of(&self, physical: &Path) -> DriverResult<Vec<XmlField>> {
        let bytes = match self.fs.read_all(physical) {
            Ok(bytes) => bytes,
            Err(e) if e.is_absent() => return Ok(Vec::new()),
            Err(e) => return Err(DriverError::io(physical, e)),
        };
        Ok(self.extract(physical, &bytes))
    }

    fn extract(&self, physical: &Path, bytes: &[u8]) -> Vec<XmlField> {
        match self.extractor.extract(bytes) {
            Ok(fields) => fields,
            Err(error) => {
                tracing::debug!(path = %physical.display(), %error, "document has no fields");
                Vec::new()
            }
        }
    }

    fn walk(
        &self,
        dir: &Path,
        catalog: &CatalogPath,
        confine: &Path,
        recursive: bool,
        top: bool,
        options: &TraversalOptions,
        out: &mut Enumeration,
    ) -> Result<(), Stop> {
        if options.cancel.is_cancelled() {
            return Err(Stop::Cancelled);
        }

        let mut listing = match self.fs.readdir(dir) {
            Ok(listing) => listing,
            Err(e) if e.is_absent() => {
                // Missing sources are empty; a subdirectory deleted mid-walk is skipped.
                if top {
                    tracing::debug!(path = %dir.display(), "source is not a directory");
                }
                return Ok(());
            }
            Err(e) => return Err(Stop::Failed(dir.to_path_buf(), e)),
        };
        listing.sort_by(|a, b| a.name.cmp(&b.name));

        let mut subdirs = Vec::new();
        for entry in &listing {
            let physical = dir.join(&entry.raw_name);
            if entry.kind.is_symlink() && !self.stays_within(&physical, confine) {
                tracing::debug!(path = %physical.display(), "link leaves the root, skipped");
                continue;
            }
            let attr = match self.fs.getattr(&physical) {
                Ok(attr) => attr,
                Err(e) if e.is_absent() => continue,
                // Unreadable entries are still listed, with zero length.
                Err(_) => FileAttr {
                    size: 0,
                    kind: entry.kind,
                    mtime: UNIX_EPOCH,
                },
            };
            let kind = if entry.kind == FileType::Symlink { attr.kind } else { entry.kind };
            if recursive && kind.is_dir() {
                subdirs.push(entry);
            }

            let Some(table_type) = options.flavor.classify(&entry.name, kind) else {
                continue;
            };
            if !options.kinds.admits(table_type) {
                continue;
            }
            if let Some(pattern) = &options.name_filter {
                if !pattern.matches(&entry.name) {
                    continue;
                }
            }

            let fields = if options.extract_fields && table_type.is_document() {
                let bytes = match self.fs.read_all(&physical) {
                    Ok(bytes) => bytes,
                    Err(e) if e.is_absent() => continue,
                    Err(e) => return Err(Stop::Failed(physical, e)),
                };
                let fields = self.extract(&physical, &bytes);
                out.field_paths.extend(fields.iter().map(|f| f.path.clone()));
                Some(fields)
            } else {
                None
            };

            let record = EntryRecord {
                parent: catalog.clone(),
                name: entry.name.clone(),
                physical,
                table_type,
                attr,
                fields,
            };
            if let Some(filter) = &options.row_filter {
                if !filter.matches(&|column| record.value(column)) {
                    continue;
                }
            }
            out.entries.push(record);
        }

        for entry in subdirs {
            self.walk(
                &dir.join(&entry.raw_name),
                &catalog.join(&entry.name),
                confine,
                true,
                false,
                options,
                out,
            )?;
        }
        Ok(())
    }

    /// Whether a link's target lies under `confine`. Dangling links stay.
    fn stays_within(&self, link: &Path, confine: &Path) -> bool {
        match self.fs.canonicalize(link) {
            Ok(target) => target.starts_with(confine),
            Err(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::MemoryBackend;
    use crate::xml::ElementPathExtractor;
    use std::time::Duration;

    fn engine() -> TraversalEngine {
        let fs = MemoryBackend::new();
        fs.add_file("/srv/docs/b.txt", "hello");
        fs.add_file("/srv/docs/a.xml", "<a><t>one</t></a>");
        fs.add_file("/srv/docs/sub/c.xml", "<c/>");
        fs.add_file("/srv/docs/sub/deeper/d.txt", "");
        fs.add_dir("/srv/docs/empty");
        TraversalEngine::new(Arc::new(fs), Arc::new(ElementPathExtractor))
    }

    fn source(catalog: &str, physical: &str, recursive: bool) -> TraversalSource {
        TraversalSource {
            catalog: CatalogPath::parse(catalog).unwrap(),
            physical: PathBuf::from(physical),
            recursive,
            confine: PathBuf::from(physical),
        }
    }

    fn names(e: &Enumeration) -> Vec<&str> {
        e.entries.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_format_modified() {
        let t = UNIX_EPOCH + Duration::new(1_709_294_400, 123_456_789);
        let text = format_modified(t);
        assert_eq!(text, "2024-03-01 12:00:00:1234");
        assert_eq!(text.len(), 24);
        assert_eq!(format_modified(UNIX_EPOCH), "1970-01-01 00:00:00:0000");
    }

    #[test]
    fn test_non_recursive_sorted_once_each() {
        let e = engine()
            .enumerate(&[source("docs", "/srv/docs", false)], &TraversalOptions::new(Flavor::FileBacked))
            .unwrap();
        assert_eq!(names(&e), ["a.xml", "b.txt", "empty", "sub"]);
    }

    #[test]
    fn test_recursive_lists_level_then_descends() {
        let e = engine()
            .enumerate(&[source("docs", "/srv/docs", true)], &TraversalOptions::new(Flavor::FileBacked))
            .unwrap();
        assert_eq!(
            names(&e),
            ["a.xml", "b.txt", "empty", "sub", "c.xml", "deeper", "d.txt"]
        );
        let d = e.entries.iter().find(|r| r.name == "d.txt").unwrap();
        assert_eq!(d.parent.to_string(), "docs/sub/deeper");
        assert_eq!(
            d.value(&PlanColumn::File(FileColumn::FullName)),
            Value::from("/srv/docs/sub/deeper/d.txt")
        );
    }

    #[test]
    fn test_files_only_still_descends() {
        let mut options = TraversalOptions::new(Flavor::FileBacked);
        options.kinds = EntryKinds {
            files: true,
            directories: false,
        };
        let e = engine()
            .enumerate(&[source("docs", "/srv/docs", true)], &options)
            .unwrap();
        assert_eq!(names(&e), ["a.xml", "b.txt", "c.xml", "d.txt"]);
    }

    #[test]
    fn test_missing_source_is_empty() {
        let e = engine()
            .enumerate(
                &[
                    source("docs/gone", "/srv/docs/gone", false),
                    source("docs/b.txt", "/srv/docs/b.txt", false),
                    source("docs/sub", "/srv/docs/sub", false),
                ],
                &TraversalOptions::new(Flavor::FileBacked),
            )
            .unwrap();
        assert!(e.failures.is_empty());
        assert_eq!(names(&e), ["c.xml", "deeper"]);
    }

    #[test]
    fn test_values() {
        let e = engine()
            .enumerate(&[source("docs", "/srv/docs", false)], &TraversalOptions::new(Flavor::FileBacked))
            .unwrap();
        let b = &e.entries[1];
        assert_eq!(b.value(&PlanColumn::File(FileColumn::Path)), Value::from("docs"));
        assert_eq!(b.value(&PlanColumn::File(FileColumn::Length)), Value::Integer(5));
        assert_eq!(b.value(&PlanColumn::File(FileColumn::Contents)), Value::Null);
        let sub = &e.entries[3];
        assert_eq!(sub.value(&PlanColumn::File(FileColumn::Length)), Value::Integer(0));
    }

    #[test]
    fn test_name_filter() {
        let mut options = TraversalOptions::new(Flavor::FileBacked);
        options.name_filter = Some(NamePattern::like("%.xml", true).unwrap());
        let e = engine()
            .enumerate(&[source("docs", "/srv/docs", true)], &options)
            .unwrap();
        assert_eq!(names(&e), ["a.xml", "c.xml"]);
    }

    #[test]
    fn test_xml_flavor_skips_plain_files_and_reads_fields() {
        let mut options = TraversalOptions::new(Flavor::XmlBacked);
        options.extract_fields = true;
        let e = engine()
            .enumerate(&[source("docs", "/srv/docs", false)], &options)
            .unwrap();
        assert_eq!(names(&e), ["a.xml", "empty", "sub"]);
        assert_eq!(
            e.entries[0].value(&PlanColumn::Field("a/t".into())),
            Value::from("one")
        );
        assert!(e.field_paths.contains("a/t"));
    }

    #[test]
    fn test_cancelled() {
        let options = TraversalOptions::new(Flavor::FileBacked);
        options.cancel.cancel();
        let err = engine()
            .enumerate(&[source("docs", "/srv/docs", true)], &options)
            .unwrap_err();
        assert!(matches!(err, DriverError::Cancelled));
    }

    #[test]
    fn test_stat() {
        let engine = engine();
        let parent = CatalogPath::parse("docs").unwrap();
        let hit = engine
            .stat(&parent, Path::new("/srv/docs"), "a.xml", Flavor::FileBacked)
            .unwrap()
            .unwrap();
        assert_eq!(hit.table_type, TableType::File);
        assert!(engine
            .stat(&parent, Path::new("/srv/docs"), "nope", Flavor::FileBacked)
            .unwrap()
            .is_none());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_names_are_listed() {
        use crate::vfs::LocalBackend;
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("ok.txt"), b"ok").unwrap();
        std::fs::write(dir.path().join(OsStr::from_bytes(b"bad\xff.txt")), b"bad!").unwrap();

        let engine = TraversalEngine::new(Arc::new(LocalBackend::new()), Arc::new(ElementPathExtractor));
        let physical = dir.path().to_str().unwrap();
        let e = engine
            .enumerate(&[source("r", physical, false)], &TraversalOptions::new(Flavor::FileBacked))
            .unwrap();
        assert!(e.failures.is_empty());
        assert_eq!(names(&e), ["bad\u{fffd}.txt", "ok.txt"]);
        assert_eq!(e.entries[0].value(&PlanColumn::File(FileColumn::Length)), Value::Integer(4));
    }
}
