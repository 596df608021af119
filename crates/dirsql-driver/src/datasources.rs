//! Named external data sources.
//!
//! Some platforms keep a native registry of data sources; others keep an
//! INI-style text file. Either way the driver only needs a list of names,
//! and a missing or unreadable source list is simply empty.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// One named source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataSource {
    pub name: String,
    pub description: String,
    /// True when listed under the system section.
    pub system: bool,
}

/// Enumerates available data sources.
pub trait DataSourceCatalog: Send + Sync {
    fn data_sources(&self) -> Vec<DataSource>;
}

/// Platform with no source registry.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDataSources;

impl DataSourceCatalog for NoDataSources {
    fn data_sources(&self) -> Vec<DataSource> {
        Vec::new()
    }
}

const USER_SECTION: &str = "ODBC Data Sources";
const SYSTEM_SECTION: &str = "ODBC System Data Sources";

/// Sources listed in an INI file under `[ODBC Data Sources]` and
/// `[ODBC System Data Sources]`.
#[derive(Debug, Clone)]
pub struct IniDataSources {
    path: PathBuf,
}

impl IniDataSources {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse INI text. Lines outside the two sections, comments and lines
    /// without `=` are ignored.
    pub fn parse(text: &str) -> Vec<DataSource> {
        let mut sources = Vec::new();
        let mut section: Option<bool> = None;
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }
            if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                let header = header.trim();
                section = if header.eq_ignore_ascii_case(USER_SECTION) {
                    Some(false)
                } else if header.eq_ignore_ascii_case(SYSTEM_SECTION) {
                    Some(true)
                } else {
                    None
                };
                continue;
            }
            let Some(system) = section else {
                continue;
            };
            if let Some((name, description)) = line.split_once('=') {
                let name = name.trim();
                if !name.is_empty() {
                    sources.push(DataSource {
                        name: name.to_string(),
                        description: description.trim().to_string(),
                        system,
                    });
                }
            }
        }
        sources
    }
}

impl DataSourceCatalog for IniDataSources {
    fn data_sources(&self) -> Vec<DataSource> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Self::parse(&String::from_utf8_lossy(&bytes)),
            Err(error) => {
                tracing::warn!(path = %self.path.display(), %error, "data source list unreadable");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INI: &str = "\
; generated
[ODBC Data Sources]
  reports = Report archive
bad line without equals

[Other]
ignored = yes

[ODBC System Data Sources]
warehouse=Central store
=no name
";

    #[test]
    fn test_parse_sections() {
        let sources = IniDataSources::parse(INI);
        assert_eq!(
            sources,
            vec![
                DataSource {
                    name: "reports".into(),
                    description: "Report archive".into(),
                    system: false,
                },
                DataSource {
                    name: "warehouse".into(),
                    description: "Central store".into(),
                    system: true,
                },
            ]
        );
    }

    #[test]
    fn test_unreadable_file_is_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        let catalog = IniDataSources::new(dir.path().join("odbc.ini"));
        assert!(catalog.data_sources().is_empty());
    }

    #[test]
    fn test_reads_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("odbc.ini");
        std::fs::write(&path, INI).unwrap();
        assert_eq!(IniDataSources::new(&path).data_sources().len(), 2);
        assert!(NoDataSources.data_sources().is_empty());
    }
}
