//! Backing-store flavors and the table types each one exposes.
//!
//! The flavor is picked once, from the connection URL, and carried
//! explicitly from then on.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::vfs::FileType;

/// Which backing store a session queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum Flavor {
    /// Plain files and directories.
    #[strum(serialize = "file")]
    FileBacked,
    /// XML-family documents and directories.
    #[strum(serialize = "xml")]
    XmlBacked,
}

/// URL prefix selecting the file-backed flavor.
pub const FILE_URL_PREFIX: &str = "dirsql:file:";
/// URL prefix selecting the XML-backed flavor.
pub const XML_URL_PREFIX: &str = "dirsql:xml:";

impl Flavor {
    /// Pick a flavor from a connection URL, or `None` if the URL isn't ours.
    pub fn from_url(url: &str) -> Option<Self> {
        let lower = url.trim().to_ascii_lowercase();
        if lower.starts_with(FILE_URL_PREFIX) {
            Some(Flavor::FileBacked)
        } else if lower.starts_with(XML_URL_PREFIX) {
            Some(Flavor::XmlBacked)
        } else {
            None
        }
    }

    pub fn url_prefix(&self) -> &'static str {
        match self {
            Flavor::FileBacked => FILE_URL_PREFIX,
            Flavor::XmlBacked => XML_URL_PREFIX,
        }
    }

    /// Table types this flavor reports, in catalog order.
    pub fn table_types(&self) -> &'static [TableType] {
        match self {
            Flavor::FileBacked => &[TableType::Directory, TableType::File],
            Flavor::XmlBacked => &[
                TableType::Directory,
                TableType::Dtd,
                TableType::Html,
                TableType::Xml,
                TableType::Xsl,
            ],
        }
    }

    /// Table type of a directory entry, or `None` if this flavor ignores it.
    pub fn classify(&self, name: &str, kind: FileType) -> Option<TableType> {
        if kind.is_dir() {
            return Some(TableType::Directory);
        }
        match self {
            Flavor::FileBacked => Some(TableType::File),
            Flavor::XmlBacked => TableType::from_extension(name),
        }
    }
}

/// Catalog `TABLE_TYPE` values.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum TableType {
    File,
    Directory,
    Xml,
    Html,
    Xsl,
    Dtd,
}

impl TableType {
    /// Document type from a file extension (XML flavor).
    pub fn from_extension(name: &str) -> Option<Self> {
        let ext = name.rsplit_once('.')?.1.to_ascii_lowercase();
        match ext.as_str() {
            "xml" => Some(TableType::Xml),
            "html" | "htm" | "xhtml" => Some(TableType::Html),
            "xsl" | "xslt" => Some(TableType::Xsl),
            "dtd" => Some(TableType::Dtd),
            _ => None,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, TableType::Directory)
    }

    /// Whether field extraction applies to this table.
    pub fn is_document(&self) -> bool {
        matches!(
            self,
            TableType::Xml | TableType::Html | TableType::Xsl | TableType::Dtd
        )
    }
}
