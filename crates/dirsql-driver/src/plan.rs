//! Query translation: parsed `SELECT` → [`QueryPlan`].
//!
//! The translator checks every column name against the flavor's
//! vocabulary, splits the `/*` recursion suffix off each `FROM` item, and
//! carries the predicate through to the traversal engine. It does no I/O;
//! XML field paths are only checked once documents have been read.

use std::str::FromStr;

use dirsql_types::{ColumnDescriptor, TypeTag};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::error::{DriverError, DriverResult};
use crate::flavor::Flavor;
use crate::sql::{CompareOp, Literal, Predicate, SelectItem, SelectQuery};

/// Suffix on a `FROM` item meaning "and all subdirectories".
pub const RECURSIVE_SUFFIX: &str = "/*";

/// The fixed file-attribute vocabulary, in canonical (`SELECT *`) order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum FileColumn {
    Path,
    Name,
    #[strum(serialize = "fullname")]
    FullName,
    Modified,
    Length,
    Contents,
}

/// Width of the rendered `modified` text.
pub const MODIFIED_WIDTH: u32 = 24;

impl FileColumn {
    pub fn descriptor(&self) -> ColumnDescriptor {
        let name = self.to_string();
        match self {
            FileColumn::Path | FileColumn::FullName => ColumnDescriptor::text(name, 1024),
            FileColumn::Name => ColumnDescriptor::text(name, 255),
            FileColumn::Modified => {
                ColumnDescriptor::new(name, TypeTag::Timestamp, MODIFIED_WIDTH)
            }
            FileColumn::Length => ColumnDescriptor::integer(name),
            FileColumn::Contents => ColumnDescriptor::new(name, TypeTag::Blob, i32::MAX as u32),
        }
    }

    /// Columns compared by name under the store's case rules.
    pub fn is_pattern_column(&self) -> bool {
        matches!(self, FileColumn::Path | FileColumn::Name | FileColumn::FullName)
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, FileColumn::Contents)
    }

    /// Every column in canonical order.
    pub fn vocabulary() -> Vec<FileColumn> {
        FileColumn::iter().collect()
    }
}

/// Display size of an XML field-path column.
pub const FIELD_WIDTH: u32 = 1024;

/// One output (or predicate) column of a plan.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PlanColumn {
    File(FileColumn),
    /// XML field path; validated against the documents actually read.
    Field(String),
}

impl PlanColumn {
    pub fn name(&self) -> String {
        match self {
            PlanColumn::File(c) => c.to_string(),
            PlanColumn::Field(path) => path.clone(),
        }
    }

    pub fn descriptor(&self) -> ColumnDescriptor {
        match self {
            PlanColumn::File(c) => c.descriptor(),
            PlanColumn::Field(path) => ColumnDescriptor::text(path.clone(), FIELD_WIDTH),
        }
    }
}

/// One `FROM` item after the recursion suffix is split off.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Source {
    pub catalog: String,
    pub recursive: bool,
}

impl Source {
    /// Split `docs/*` into (`docs`, recursive).
    pub fn parse(item: &str) -> DriverResult<Self> {
        let trimmed = item.trim();
        let (catalog, recursive) = match trimmed.strip_suffix(RECURSIVE_SUFFIX) {
            Some(base) => (base, true),
            None => match trimmed
                .strip_suffix('*')
                .and_then(|b| b.strip_suffix(std::path::MAIN_SEPARATOR))
            {
                Some(base) => (base, true),
                None => (trimmed, false),
            },
        };
        if catalog.trim_matches(|c| c == '/' || c == std::path::MAIN_SEPARATOR).is_empty() {
            return Err(DriverError::malformed(format!(
                "table reference '{}' has no path",
                item
            )));
        }
        Ok(Self {
            catalog: catalog.to_string(),
            recursive,
        })
    }
}

/// Everything needed to run one query.
#[derive(Clone, Debug)]
pub struct QueryPlan {
    pub flavor: Flavor,
    pub columns: Vec<PlanColumn>,
    pub sources: Vec<Source>,
    pub predicate: Option<Predicate>,
}

impl QueryPlan {
    pub fn descriptors(&self) -> Vec<ColumnDescriptor> {
        self.columns.iter().map(PlanColumn::descriptor).collect()
    }

    /// Field-path columns named anywhere in the plan.
    pub fn field_columns(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = self
            .columns
            .iter()
            .filter_map(|c| match c {
                PlanColumn::Field(p) => Some(p.as_str()),
                PlanColumn::File(_) => None,
            })
            .collect();
        if let Some(predicate) = &self.predicate {
            for cmp in predicate.comparisons() {
                if FileColumn::from_str(&cmp.column).is_err() && !fields.contains(&cmp.column.as_str()) {
                    fields.push(cmp.column.as_str());
                }
            }
        }
        fields
    }

    pub fn needs_fields(&self) -> bool {
        !self.field_columns().is_empty()
    }
}

/// Builds [`QueryPlan`]s for one flavor.
#[derive(Clone, Copy, Debug)]
pub struct QueryTranslator {
    flavor: Flavor,
}

impl QueryTranslator {
    pub fn new(flavor: Flavor) -> Self {
        Self { flavor }
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    pub fn translate(&self, query: &SelectQuery) -> DriverResult<QueryPlan> {
        if query.from.is_empty() {
            return Err(DriverError::malformed("no table references"));
        }
        let sources = query
            .from
            .iter()
            .map(|table| match &table.path {
                Some(path) => Source::parse(path),
                None => Err(DriverError::malformed("table reference without a path")),
            })
            .collect::<DriverResult<Vec<_>>>()?;

        let mut columns = Vec::new();
        for item in &query.select {
            match item {
                SelectItem::Wildcard => {
                    columns.extend(FileColumn::iter().map(PlanColumn::File));
                }
                SelectItem::Column(name) => columns.push(self.column(name)?),
            }
        }
        if columns.is_empty() {
            return Err(DriverError::malformed("empty select list"));
        }

        if let Some(predicate) = &query.predicate {
            self.check_predicate(predicate)?;
        }

        tracing::debug!(
            flavor = %self.flavor,
            columns = columns.len(),
            sources = sources.len(),
            filtered = query.predicate.is_some(),
            "query planned"
        );

        Ok(QueryPlan {
            flavor: self.flavor,
            columns,
            sources,
            predicate: query.predicate.clone(),
        })
    }

    fn column(&self, name: &str) -> DriverResult<PlanColumn> {
        match FileColumn::from_str(name) {
            Ok(c) => Ok(PlanColumn::File(c)),
            Err(_) if self.flavor == Flavor::XmlBacked => Ok(PlanColumn::Field(name.to_string())),
            Err(_) => Err(DriverError::unknown_column(name)),
        }
    }

    fn check_predicate(&self, predicate: &Predicate) -> DriverResult<()> {
        for cmp in predicate.comparisons() {
            let column = self.column(&cmp.column)?;
            let PlanColumn::File(file) = column else {
                continue;
            };
            let like = matches!(cmp.op, CompareOp::Like | CompareOp::NotLike);
            match (file, &cmp.value) {
                (FileColumn::Length, Literal::Text(_)) => {
                    return Err(DriverError::malformed(format!(
                        "length compares with integers, got '{}'",
                        cmp.value.unescaped()
                    )));
                }
                (FileColumn::Length, Literal::Integer(_)) if like => {
                    return Err(DriverError::malformed("LIKE applies to text columns"));
                }
                (FileColumn::Modified, Literal::Integer(_)) => {
                    return Err(DriverError::malformed(
                        "modified compares with text in 'yyyy-MM-dd HH:mm:ss:SSnn' form",
                    ));
                }
                (_, Literal::Integer(_)) if like => {
                    return Err(DriverError::malformed("LIKE needs a quoted pattern"));
                }
                _ => {}
            }
        }
        Ok(())
    }
}
