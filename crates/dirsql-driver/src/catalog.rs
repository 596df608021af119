//! Schema/catalog introspection.
//!
//! Every answer is a [`TabularResult`] whose column set is fixed per
//! operation and returned even when there are no rows. Table and column
//! listings go through the same resolver and traversal engine as queries,
//! so what the catalog reports is what a query would see.
//!
//! | Operation | Columns |
//! |-----------|---------|
//! | [`list_roots`](CatalogService::list_roots) | `TABLE_CAT` |
//! | [`list_tables`](CatalogService::list_tables) | `TABLE_CAT, TABLE_SCHEM, TABLE_NAME, TABLE_TYPE, REMARKS` |
//! | [`list_table_types`](CatalogService::list_table_types) | `TABLE_TYPE` |
//! | [`list_columns`](CatalogService::list_columns) | the 18 standard column-description columns |
//! | [`list_identifying_columns`](CatalogService::list_identifying_columns) | `TABLE_CAT, TABLE_SCHEM, TABLE_NAME, COLUMN_NAME, KEY_SEQ, PK_NAME` |
//!
//! Relational features with no meaning here ([`Introspection`]) answer
//! with an empty result of the right shape.

use std::collections::HashSet;
use std::str::FromStr;

use dirsql_types::{
    ColumnDescriptor, Identity, Permissions, TabularResult, TabularResultBuilder, TypeTag, Value,
};
use strum::{Display, EnumIter, EnumString};

use crate::error::DriverResult;
use crate::flavor::{Flavor, TableType};
use crate::pattern::NamePattern;
use crate::plan::{FIELD_WIDTH, FileColumn, Source};
use crate::resolver::PathResolver;
use crate::traversal::{EntryKinds, EntryRecord, TraversalEngine, TraversalOptions, TraversalSource};

/// Display width for identifier-like catalog columns.
const NAME_WIDTH: u32 = 255;

/// Column the file flavor identifies rows by.
pub const IDENTIFYING_COLUMN: FileColumn = FileColumn::FullName;

use TypeTag::{Integer64 as I, Text as T};

const ROOTS: &[(&str, TypeTag)] = &[("TABLE_CAT", T)];

const TABLES: &[(&str, TypeTag)] = &[
    ("TABLE_CAT", T),
    ("TABLE_SCHEM", T),
    ("TABLE_NAME", T),
    ("TABLE_TYPE", T),
    ("REMARKS", T),
];

const TABLE_TYPES: &[(&str, TypeTag)] = &[("TABLE_TYPE", T)];

const COLUMNS: &[(&str, TypeTag)] = &[
    ("TABLE_CAT", T),
    ("TABLE_SCHEM", T),
    ("TABLE_NAME", T),
    ("COLUMN_NAME", T),
    ("DATA_TYPE", I),
    ("TYPE_NAME", T),
    ("COLUMN_SIZE", I),
    ("BUFFER_LENGTH", I),
    ("DECIMAL_DIGITS", I),
    ("NUM_PREC_RADIX", I),
    ("NULLABLE", I),
    ("REMARKS", T),
    ("COLUMN_DEF", T),
    ("SQL_DATA_TYPE", I),
    ("SQL_DATETIME_SUB", I),
    ("CHAR_OCTET_LENGTH", I),
    ("ORDINAL_POSITION", I),
    ("IS_NULLABLE", T),
];

const IDENTIFYING: &[(&str, TypeTag)] = &[
    ("TABLE_CAT", T),
    ("TABLE_SCHEM", T),
    ("TABLE_NAME", T),
    ("COLUMN_NAME", T),
    ("KEY_SEQ", I),
    ("PK_NAME", T),
];

const PROCEDURES: &[(&str, TypeTag)] = &[
    ("PROCEDURE_CAT", T),
    ("PROCEDURE_SCHEM", T),
    ("PROCEDURE_NAME", T),
    ("REMARKS", T),
    ("PROCEDURE_TYPE", I),
    ("SPECIFIC_NAME", T),
];

const PROCEDURE_COLUMNS: &[(&str, TypeTag)] = &[
    ("PROCEDURE_CAT", T),
    ("PROCEDURE_SCHEM", T),
    ("PROCEDURE_NAME", T),
    ("COLUMN_NAME", T),
    ("COLUMN_TYPE", I),
    ("DATA_TYPE", I),
    ("TYPE_NAME", T),
    ("PRECISION", I),
    ("LENGTH", I),
    ("SCALE", I),
    ("RADIX", I),
    ("NULLABLE", I),
    ("REMARKS", T),
];

const KEYS: &[(&str, TypeTag)] = &[
    ("PKTABLE_CAT", T),
    ("PKTABLE_SCHEM", T),
    ("PKTABLE_NAME", T),
    ("PKCOLUMN_NAME", T),
    ("FKTABLE_CAT", T),
    ("FKTABLE_SCHEM", T),
    ("FKTABLE_NAME", T),
    ("FKCOLUMN_NAME", T),
    ("KEY_SEQ", I),
    ("UPDATE_RULE", I),
    ("DELETE_RULE", I),
    ("FK_NAME", T),
    ("PK_NAME", T),
    ("DEFERRABILITY", I),
];

const INDEX_INFO: &[(&str, TypeTag)] = &[
    ("TABLE_CAT", T),
    ("TABLE_SCHEM", T),
    ("TABLE_NAME", T),
    ("NON_UNIQUE", I),
    ("INDEX_QUALIFIER", T),
    ("INDEX_NAME", T),
    ("TYPE", I),
    ("ORDINAL_POSITION", I),
    ("COLUMN_NAME", T),
    ("ASC_OR_DESC", T),
    ("CARDINALITY", I),
    ("PAGES", I),
    ("FILTER_CONDITION", T),
];

const UDTS: &[(&str, TypeTag)] = &[
    ("TYPE_CAT", T),
    ("TYPE_SCHEM", T),
    ("TYPE_NAME", T),
    ("CLASS_NAME", T),
    ("DATA_TYPE", I),
    ("REMARKS", T),
    ("BASE_TYPE", I),
];

const SUPER_TABLES: &[(&str, TypeTag)] = &[
    ("TABLE_CAT", T),
    ("TABLE_SCHEM", T),
    ("TABLE_NAME", T),
    ("SUPERTABLE_NAME", T),
];

const SUPER_TYPES: &[(&str, TypeTag)] = &[
    ("TYPE_CAT", T),
    ("TYPE_SCHEM", T),
    ("TYPE_NAME", T),
    ("SUPERTYPE_CAT", T),
    ("SUPERTYPE_SCHEM", T),
    ("SUPERTYPE_NAME", T),
];

const ATTRIBUTES: &[(&str, TypeTag)] = &[
    ("TYPE_CAT", T),
    ("TYPE_SCHEM", T),
    ("TYPE_NAME", T),
    ("ATTR_NAME", T),
    ("DATA_TYPE", I),
    ("ATTR_TYPE_NAME", T),
    ("ATTR_SIZE", I),
    ("DECIMAL_DIGITS", I),
    ("NUM_PREC_RADIX", I),
    ("NULLABLE", I),
    ("REMARKS", T),
    ("ATTR_DEF", T),
    ("SQL_DATA_TYPE", I),
    ("SQL_DATETIME_SUB", I),
    ("CHAR_OCTET_LENGTH", I),
    ("ORDINAL_POSITION", I),
    ("IS_NULLABLE", T),
    ("SCOPE_CATALOG", T),
    ("SCOPE_SCHEMA", T),
    ("SCOPE_TABLE", T),
    ("SOURCE_DATA_TYPE", I),
];

const VERSION_COLUMNS: &[(&str, TypeTag)] = &[
    ("SCOPE", I),
    ("COLUMN_NAME", T),
    ("DATA_TYPE", I),
    ("TYPE_NAME", T),
    ("COLUMN_SIZE", I),
    ("BUFFER_LENGTH", I),
    ("DECIMAL_DIGITS", I),
    ("PSEUDO_COLUMN", I),
];

const COLUMN_PRIVILEGES: &[(&str, TypeTag)] = &[
    ("TABLE_CAT", T),
    ("TABLE_SCHEM", T),
    ("TABLE_NAME", T),
    ("COLUMN_NAME", T),
    ("GRANTOR", T),
    ("GRANTEE", T),
    ("PRIVILEGE", T),
    ("IS_GRANTABLE", T),
];

const TABLE_PRIVILEGES: &[(&str, TypeTag)] = &[
    ("TABLE_CAT", T),
    ("TABLE_SCHEM", T),
    ("TABLE_NAME", T),
    ("GRANTOR", T),
    ("GRANTEE", T),
    ("PRIVILEGE", T),
    ("IS_GRANTABLE", T),
];

fn shape(columns: &[(&str, TypeTag)]) -> Vec<ColumnDescriptor> {
    columns
        .iter()
        .map(|&(name, tag)| match tag {
            TypeTag::Integer64 => ColumnDescriptor::integer(name),
            other => ColumnDescriptor::new(name, other, NAME_WIDTH),
        })
        .collect()
}

/// Introspection calls that always answer with zero rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Introspection {
    Procedures,
    ProcedureColumns,
    ImportedKeys,
    ExportedKeys,
    CrossReference,
    IndexInfo,
    #[strum(serialize = "udts")]
    UserDefinedTypes,
    SuperTables,
    SuperTypes,
    Attributes,
    VersionColumns,
    ColumnPrivileges,
    TablePrivileges,
}

impl Introspection {
    pub fn columns(&self) -> Vec<ColumnDescriptor> {
        shape(match self {
            Introspection::Procedures => PROCEDURES,
            Introspection::ProcedureColumns => PROCEDURE_COLUMNS,
            Introspection::ImportedKeys
            | Introspection::ExportedKeys
            | Introspection::CrossReference => KEYS,
            Introspection::IndexInfo => INDEX_INFO,
            Introspection::UserDefinedTypes => UDTS,
            Introspection::SuperTables => SUPER_TABLES,
            Introspection::SuperTypes => SUPER_TYPES,
            Introspection::Attributes => ATTRIBUTES,
            Introspection::VersionColumns => VERSION_COLUMNS,
            Introspection::ColumnPrivileges => COLUMN_PRIVILEGES,
            Introspection::TablePrivileges => TABLE_PRIVILEGES,
        })
    }
}

/// One column a table exposes.
struct TableColumn {
    descriptor: ColumnDescriptor,
    nullable: bool,
}

/// Introspection bound to one session's root, identity and flavor.
#[derive(Debug, Clone)]
pub struct CatalogService {
    resolver: PathResolver,
    engine: TraversalEngine,
    flavor: Flavor,
    identity: Identity,
    bound_root: String,
}

impl CatalogService {
    pub fn new(
        resolver: PathResolver,
        engine: TraversalEngine,
        flavor: Flavor,
        identity: Identity,
        bound_root: impl Into<String>,
    ) -> Self {
        Self {
            resolver,
            engine,
            flavor,
            identity,
            bound_root: bound_root.into(),
        }
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    /// Registered roots this identity may list, sorted by name.
    pub fn list_roots(&self) -> DriverResult<TabularResult> {
        let mut out = TabularResultBuilder::new(shape(ROOTS));
        let snapshot = self.resolver.registry().snapshot();
        for (name, root) in snapshot.iter() {
            if root.authorize(&self.identity, Permissions::LIST) {
                out.push_row(vec![Value::from(name.as_str())])?;
            }
        }
        Ok(out.build())
    }

    /// Tables (entries) under `catalog`, or under the bound root.
    ///
    /// `catalog` may carry the `/*` suffix to list the whole subtree.
    /// `table_pattern` is a `LIKE` pattern over entry names; `types` keeps
    /// only the named table types.
    #[tracing::instrument(skip(self, types), name = "catalog.list_tables")]
    pub fn list_tables(
        &self,
        catalog: Option<&str>,
        table_pattern: Option<&str>,
        types: Option<&[String]>,
    ) -> DriverResult<TabularResult> {
        let mut out = TabularResultBuilder::new(shape(TABLES));

        let wanted: Option<HashSet<TableType>> = types.map(|types| {
            types
                .iter()
                .filter_map(|t| TableType::from_str(t.trim()).ok())
                .filter(|t| self.flavor.table_types().contains(t))
                .collect()
        });
        let kinds = match &wanted {
            Some(set) => EntryKinds {
                files: set.iter().any(|t| !t.is_directory()),
                directories: set.contains(&TableType::Directory),
            },
            None => EntryKinds::ALL,
        };
        if !kinds.files && !kinds.directories {
            return Ok(out.build());
        }

        for entry in self.tables(catalog, table_pattern, kinds)? {
            if wanted.as_ref().is_some_and(|set| !set.contains(&entry.table_type)) {
                continue;
            }
            out.push_row(vec![
                Value::Text(entry.parent.to_string()),
                Value::Null,
                Value::Text(entry.name.clone()),
                Value::from(entry.table_type.to_string()),
                Value::Null,
            ])?;
        }
        Ok(out.build())
    }

    /// Table types this flavor reports.
    pub fn list_table_types(&self) -> DriverResult<TabularResult> {
        let mut out = TabularResultBuilder::new(shape(TABLE_TYPES));
        for table_type in self.flavor.table_types() {
            out.push_row(vec![Value::from(table_type.to_string())])?;
        }
        Ok(out.build())
    }

    /// Columns of every table matching `table_pattern` under `catalog`.
    ///
    /// Directories (and, in the file flavor, files) expose the file
    /// vocabulary. XML-family documents expose their field paths.
    #[tracing::instrument(skip(self), name = "catalog.list_columns")]
    pub fn list_columns(
        &self,
        catalog: Option<&str>,
        table_pattern: Option<&str>,
        column_pattern: Option<&str>,
    ) -> DriverResult<TabularResult> {
        let mut out = TabularResultBuilder::new(shape(COLUMNS));
        // File vocabulary names are case-insensitive; field paths are not.
        let vocabulary_filter = column_pattern
            .map(|p| NamePattern::like(p, false))
            .transpose()?;
        let field_filter = column_pattern
            .map(|p| NamePattern::like(p, true))
            .transpose()?;

        for entry in self.tables(catalog, table_pattern, EntryKinds::ALL)? {
            let (columns, filter) = if entry.table_type.is_document() {
                (self.document_columns(&entry)?, field_filter.as_ref())
            } else {
                (vocabulary_columns(), vocabulary_filter.as_ref())
            };

            for (ordinal, column) in columns.iter().enumerate() {
                if filter.is_some_and(|f| !f.matches(column.descriptor.name())) {
                    continue;
                }
                out.push_row(column_row(&entry, column, ordinal + 1))?;
            }
        }
        Ok(out.build())
    }

    /// Columns that identify rows of `table` under `catalog`.
    ///
    /// Directories and plain files are identified by `fullname`; documents
    /// have no identifying column. A missing table yields no rows.
    pub fn list_identifying_columns(
        &self,
        catalog: Option<&str>,
        table: &str,
    ) -> DriverResult<TabularResult> {
        let mut out = TabularResultBuilder::new(shape(IDENTIFYING));
        let catalog = catalog.unwrap_or(&self.bound_root);
        let resolved = self
            .resolver
            .resolve(catalog, &self.identity, Permissions::LIST)?;
        let Some(entry) =
            self.engine
                .stat(&resolved.catalog, &resolved.physical, table, self.flavor)?
        else {
            return Ok(out.build());
        };
        if !entry.table_type.is_document() {
            out.push_row(vec![
                Value::Text(entry.parent.to_string()),
                Value::Null,
                Value::Text(entry.name.clone()),
                Value::from(IDENTIFYING_COLUMN.to_string()),
                Value::Integer(1),
                Value::Null,
            ])?;
        }
        Ok(out.build())
    }

    /// Zero-row answer for an introspection call this driver has no use for.
    pub fn empty(&self, kind: Introspection) -> TabularResult {
        tracing::debug!(%kind, "unsupported introspection answered empty");
        TabularResult::empty(kind.columns())
    }

    fn tables(
        &self,
        catalog: Option<&str>,
        table_pattern: Option<&str>,
        kinds: EntryKinds,
    ) -> DriverResult<Vec<EntryRecord>> {
        let source = Source::parse(catalog.unwrap_or(&self.bound_root))?;
        let resolved = self
            .resolver
            .resolve(&source.catalog, &self.identity, Permissions::LIST)?;

        let mut options = TraversalOptions::new(self.flavor);
        options.kinds = kinds;
        options.name_filter = table_pattern
            .map(|p| NamePattern::like(p, self.engine.case_sensitive()))
            .transpose()?;

        let sources = [TraversalSource {
            catalog: resolved.catalog,
            physical: resolved.physical,
            recursive: source.recursive,
            confine: resolved.confine,
        }];
        self.engine.enumerate(&sources, &options)?.into_result()
    }

    fn document_columns(&self, entry: &EntryRecord) -> DriverResult<Vec<TableColumn>> {
        Ok(self
            .engine
            .fields_of(&entry.physical)?
            .into_iter()
            .map(|field| TableColumn {
                descriptor: ColumnDescriptor::text(field.path, FIELD_WIDTH),
                nullable: true,
            })
            .collect())
    }
}

fn vocabulary_columns() -> Vec<TableColumn> {
    FileColumn::vocabulary()
        .into_iter()
        .map(|c| TableColumn {
            descriptor: c.descriptor(),
            nullable: c.is_nullable(),
        })
        .collect()
}

fn column_row(entry: &EntryRecord, column: &TableColumn, ordinal: usize) -> Vec<Value> {
    let d = &column.descriptor;
    let tag = d.type_tag();
    let size = i64::from(d.display_size());
    let (digits, radix) = match tag {
        TypeTag::Integer64 => (Value::Integer(0), Value::Integer(10)),
        _ => (Value::Null, Value::Null),
    };
    let octets = match tag {
        TypeTag::Text => Value::Integer(size),
        _ => Value::Null,
    };
    vec![
        Value::Text(entry.parent.to_string()),
        Value::Null,
        Value::Text(entry.name.clone()),
        Value::from(d.name()),
        Value::Integer(tag.sql_type()),
        Value::from(tag.type_name()),
        Value::Integer(size),
        Value::Null,
        digits,
        radix,
        Value::Integer(i64::from(column.nullable)),
        Value::Null,
        Value::Null,
        Value::Null,
        Value::Null,
        octets,
        Value::Integer(ordinal as i64),
        Value::from(if column.nullable { "YES" } else { "NO" }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DriverError;
    use crate::registry::{AllowAll, Grant, NamespaceRegistry, VirtualRoot};
    use crate::vfs::MemoryBackend;
    use crate::xml::ElementPathExtractor;
    use std::sync::Arc;
    use strum::IntoEnumIterator;

    fn service(flavor: Flavor) -> CatalogService {
        let registry = NamespaceRegistry::shared();
        registry
            .register(VirtualRoot::new("docs", "/srv/docs", AllowAll))
            .unwrap();
        registry
            .register(VirtualRoot::new("hidden", "/srv/hidden", Grant(Permissions::READ)))
            .unwrap();
        let fs = MemoryBackend::new();
        fs.add_file("/srv/docs/a.xml", "<book id=\"1\"><title>Dune</title></book>");
        fs.add_file("/srv/docs/b.txt", "hello");
        fs.add_file("/srv/docs/sub/c.xml", "<c/>");
        let fs: Arc<dyn crate::vfs::VfsOps> = Arc::new(fs);
        let resolver = PathResolver::new(registry, fs.clone());
        let engine = TraversalEngine::new(fs, Arc::new(ElementPathExtractor));
        CatalogService::new(resolver, engine, flavor, Identity::anonymous(), "docs")
    }

    #[test]
    fn test_list_roots_skips_unlistable() {
        let roots = service(Flavor::FileBacked).list_roots().unwrap();
        assert_eq!(roots.column_names(), ["TABLE_CAT"]);
        assert_eq!(roots.texts("TABLE_CAT"), ["docs"]);
    }

    #[test]
    fn test_list_tables_shape_and_rows() {
        let tables = service(Flavor::FileBacked).list_tables(None, None, None).unwrap();
        assert_eq!(
            tables.column_names(),
            ["TABLE_CAT", "TABLE_SCHEM", "TABLE_NAME", "TABLE_TYPE", "REMARKS"]
        );
        assert_eq!(tables.texts("TABLE_NAME"), ["a.xml", "b.txt", "sub"]);
        assert_eq!(tables.texts("TABLE_TYPE"), ["FILE", "FILE", "DIRECTORY"]);
        assert_eq!(tables.texts("TABLE_CAT"), ["docs", "docs", "docs"]);
    }

    #[test]
    fn test_list_tables_filters() {
        let svc = service(Flavor::FileBacked);
        let dirs = svc
            .list_tables(Some("docs"), None, Some(&["directory".to_string()]))
            .unwrap();
        assert_eq!(dirs.texts("TABLE_NAME"), ["sub"]);

        let xml = svc.list_tables(Some("docs/*"), Some("%.xml"), None).unwrap();
        assert_eq!(xml.texts("TABLE_NAME"), ["a.xml", "c.xml"]);
        assert_eq!(xml.texts("TABLE_CAT"), ["docs", "docs/sub"]);

        let none = svc
            .list_tables(None, None, Some(&["VIEW".to_string()]))
            .unwrap();
        assert!(none.is_empty());
        assert_eq!(none.column_count(), 5);
    }

    #[test]
    fn test_list_tables_idempotent() {
        let svc = service(Flavor::FileBacked);
        let first = svc.list_tables(Some("docs/*"), Some("%"), None).unwrap();
        let second = svc.list_tables(Some("docs/*"), Some("%"), None).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_xml_flavor_tables() {
        let tables = service(Flavor::XmlBacked).list_tables(None, None, None).unwrap();
        assert_eq!(tables.texts("TABLE_NAME"), ["a.xml", "sub"]);
        assert_eq!(tables.texts("TABLE_TYPE"), ["XML", "DIRECTORY"]);

        let types = service(Flavor::XmlBacked).list_table_types().unwrap();
        assert_eq!(types.texts("TABLE_TYPE"), ["DIRECTORY", "DTD", "HTML", "XML", "XSL"]);
    }

    #[test]
    fn test_list_columns_vocabulary() {
        let cols = service(Flavor::FileBacked)
            .list_columns(None, Some("sub"), None)
            .unwrap();
        assert_eq!(cols.column_count(), 18);
        assert_eq!(
            cols.texts("COLUMN_NAME"),
            ["path", "name", "fullname", "modified", "length", "contents"]
        );
        assert_eq!(
            cols.column("DATA_TYPE").unwrap()[4],
            Value::Integer(TypeTag::Integer64.sql_type())
        );
        assert_eq!(cols.texts("IS_NULLABLE"), ["NO", "NO", "NO", "NO", "NO", "YES"]);
        assert_eq!(cols.column("ORDINAL_POSITION").unwrap()[0], Value::Integer(1));

        let filtered = service(Flavor::FileBacked)
            .list_columns(None, Some("sub"), Some("%NAME"))
            .unwrap();
        assert_eq!(filtered.texts("COLUMN_NAME"), ["name", "fullname"]);
    }

    #[test]
    fn test_list_columns_of_document() {
        let cols = service(Flavor::XmlBacked)
            .list_columns(None, Some("a.xml"), None)
            .unwrap();
        assert_eq!(cols.texts("COLUMN_NAME"), ["book", "book/@id", "book/title"]);
        assert_eq!(cols.texts("TYPE_NAME"), ["VARCHAR", "VARCHAR", "VARCHAR"]);
    }

    #[test]
    fn test_identifying_columns() {
        let svc = service(Flavor::FileBacked);
        let keys = svc.list_identifying_columns(None, "b.txt").unwrap();
        assert_eq!(
            keys.column_names(),
            ["TABLE_CAT", "TABLE_SCHEM", "TABLE_NAME", "COLUMN_NAME", "KEY_SEQ", "PK_NAME"]
        );
        assert_eq!(keys.texts("COLUMN_NAME"), ["fullname"]);

        let missing = svc.list_identifying_columns(None, "nope").unwrap();
        assert!(missing.is_empty());
        assert_eq!(missing.column_count(), 6);
    }

    #[test]
    fn test_unsupported_introspection_is_empty() {
        let svc = service(Flavor::FileBacked);
        for kind in Introspection::iter() {
            let result = svc.empty(kind);
            assert!(result.is_empty(), "{kind}");
            assert!(result.column_count() > 0, "{kind}");
        }
        let keys = svc.empty(Introspection::ImportedKeys);
        assert_eq!(keys.column_names()[0], "PKTABLE_CAT");
    }

    #[test]
    fn test_errors_surface() {
        let svc = service(Flavor::FileBacked);
        let err = svc.list_tables(Some("nope"), None, None).unwrap_err();
        assert!(matches!(err, DriverError::UnknownRoot(_)));
        let err = svc.list_tables(Some("hidden"), None, None).unwrap_err();
        assert!(matches!(err, DriverError::Authorization { .. }));
        // Missing directory under a known root is empty, not an error.
        assert!(svc.list_tables(Some("docs/gone"), None, None).unwrap().is_empty());
    }
}
