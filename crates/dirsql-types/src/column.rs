//! Column descriptors.
//!
//! A sequence of [`ColumnDescriptor`]s fully describes the shape of a
//! [`TabularResult`](crate::TabularResult). Descriptors are immutable once
//! built and stay index-aligned with the result's value columns.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Semantic type of a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum TypeTag {
    /// Character data.
    #[strum(serialize = "VARCHAR", serialize = "text")]
    Text,
    /// Signed 64-bit integer.
    #[strum(serialize = "BIGINT", serialize = "integer64")]
    Integer64,
    /// Point in time, transported as fixed-width sortable text.
    #[strum(serialize = "TIMESTAMP")]
    Timestamp,
    /// Opaque bytes.
    #[strum(serialize = "BLOB")]
    Blob,
}

impl TypeTag {
    /// Numeric SQL type code reported in `DATA_TYPE` catalog columns.
    ///
    /// Codes follow the ODBC/JDBC `java.sql.Types` numbering.
    pub fn sql_type(&self) -> i64 {
        match self {
            TypeTag::Text => 12,
            TypeTag::Integer64 => -5,
            TypeTag::Timestamp => 93,
            TypeTag::Blob => 2004,
        }
    }

    /// Type name reported in `TYPE_NAME` catalog columns.
    pub fn type_name(&self) -> &'static str {
        match self {
            TypeTag::Text => "VARCHAR",
            TypeTag::Integer64 => "BIGINT",
            TypeTag::Timestamp => "TIMESTAMP",
            TypeTag::Blob => "BLOB",
        }
    }
}

/// Name, semantic type and display size of one result column.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    name: String,
    type_tag: TypeTag,
    display_size: u32,
}

impl ColumnDescriptor {
    /// Create a descriptor.
    pub fn new(name: impl Into<String>, type_tag: TypeTag, display_size: u32) -> Self {
        Self {
            name: name.into(),
            type_tag,
            display_size,
        }
    }

    /// Text column.
    pub fn text(name: impl Into<String>, display_size: u32) -> Self {
        Self::new(name, TypeTag::Text, display_size)
    }

    /// 64-bit integer column (display size 20: sign plus 19 digits).
    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, TypeTag::Integer64, 20)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_tag(&self) -> TypeTag {
        self.type_tag
    }

    pub fn display_size(&self) -> u32 {
        self.display_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_type_tag_names() {
        assert_eq!(TypeTag::Text.to_string(), "VARCHAR");
        assert_eq!(TypeTag::Integer64.type_name(), "BIGINT");
        assert_eq!(TypeTag::from_str("timestamp").unwrap(), TypeTag::Timestamp);
        assert_eq!(TypeTag::from_str("text").unwrap(), TypeTag::Text);
    }

    #[test]
    fn test_sql_type_codes() {
        assert_eq!(TypeTag::Text.sql_type(), 12);
        assert_eq!(TypeTag::Integer64.sql_type(), -5);
        assert_eq!(TypeTag::Timestamp.sql_type(), 93);
    }

    #[test]
    fn test_descriptor_constructors() {
        let col = ColumnDescriptor::integer("length");
        assert_eq!(col.name(), "length");
        assert_eq!(col.type_tag(), TypeTag::Integer64);
        assert_eq!(col.display_size(), 20);

        let col = ColumnDescriptor::text("name", 255);
        assert_eq!(col.type_tag(), TypeTag::Text);
        assert_eq!(col.display_size(), 255);
    }
}
