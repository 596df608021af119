//! Column-oriented tabular results.
//!
//! A [`TabularResult`] is the single answer shape for both queries and
//! catalog introspection. Values are stored as one sequence per column; row
//! `i` across all sequences describes one logical entity (a file, a
//! directory, a catalog row).
//!
//! Results are built once through [`TabularResultBuilder`], which enforces
//! that every column has the same length, and are never mutated afterwards.

use serde::Serialize;
use thiserror::Error;

use crate::column::ColumnDescriptor;
use crate::value::Value;

/// Shape violations caught while building a result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResultError {
    #[error("row has {got} values but the result has {expected} columns")]
    RowWidth { expected: usize, got: usize },
}

/// Immutable column-oriented answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabularResult {
    columns: Vec<ColumnDescriptor>,
    values: Vec<Vec<Value>>,
}

impl TabularResult {
    /// A result with the given shape and zero rows.
    pub fn empty(columns: Vec<ColumnDescriptor>) -> Self {
        let values = vec![Vec::new(); columns.len()];
        Self { columns, values }
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.values.first().map(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name()).collect()
    }

    /// Position of a column, matched case-insensitively.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name().eq_ignore_ascii_case(name))
    }

    /// All values of the column at `index`.
    pub fn column_values(&self, index: usize) -> Option<&[Value]> {
        self.values.get(index).map(Vec::as_slice)
    }

    /// All values of the named column.
    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.column_index(name).and_then(|i| self.column_values(i))
    }

    /// Text values of the named column, skipping non-text cells.
    ///
    /// Mostly useful in tests and for printing single-column answers.
    pub fn texts(&self, name: &str) -> Vec<&str> {
        self.column(name)
            .map(|vals| vals.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        (index < self.row_count()).then_some(Row {
            result: self,
            index,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        (0..self.row_count()).map(move |index| Row {
            result: self,
            index,
        })
    }
}

/// Borrowed view of one row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    result: &'a TabularResult,
    index: usize,
}

impl<'a> Row<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn get(&self, column: usize) -> Option<&'a Value> {
        self.result.values.get(column).and_then(|c| c.get(self.index))
    }

    pub fn get_by_name(&self, name: &str) -> Option<&'a Value> {
        self.result.column_index(name).and_then(|c| self.get(c))
    }

    pub fn values(&self) -> impl Iterator<Item = &'a Value> + 'a {
        let index = self.index;
        self.result.values.iter().map(move |c| &c[index])
    }
}

/// Row-at-a-time builder that produces a column-oriented result.
#[derive(Debug)]
pub struct TabularResultBuilder {
    columns: Vec<ColumnDescriptor>,
    values: Vec<Vec<Value>>,
}

impl TabularResultBuilder {
    pub fn new(columns: Vec<ColumnDescriptor>) -> Self {
        let values = vec![Vec::new(); columns.len()];
        Self { columns, values }
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Append one row. The row must have exactly one value per column.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), ResultError> {
        if row.len() != self.columns.len() {
            return Err(ResultError::RowWidth {
                expected: self.columns.len(),
                got: row.len(),
            });
        }
        for (column, value) in self.values.iter_mut().zip(row) {
            column.push(value);
        }
        Ok(())
    }

    pub fn row_count(&self) -> usize {
        self.values.first().map(Vec::len).unwrap_or(0)
    }

    pub fn build(self) -> TabularResult {
        TabularResult {
            columns: self.columns,
            values: self.values,
        }
    }
}
