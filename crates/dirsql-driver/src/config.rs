//! RON configuration for roots and data sources.
//!
//! ```ron
//! (
//!     roots: [
//!         (name: "docs", location: "~/docs", access: AllowAll),
//!         (name: "shared", location: "$SHARE/reports", access: ReadOnly),
//!         (name: "private", location: "/srv/private", access: Identities(["amy"])),
//!     ],
//!     data_sources: Some("/etc/odbc.ini"),
//! )
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dirsql_types::{Identity, Permissions};
use serde::{Deserialize, Serialize};

use crate::datasources::{DataSourceCatalog, IniDataSources, NoDataSources};
use crate::error::{DriverError, DriverResult};
use crate::registry::{Authorize, NamespaceRegistry, VirtualRoot};

/// Who may do what under a configured root.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AccessPolicy {
    #[default]
    AllowAll,
    /// Read and list, nothing else.
    ReadOnly,
    /// Any permission, for these identities only.
    Identities(Vec<String>),
    DenyAll,
}

impl Authorize for AccessPolicy {
    fn authorize(&self, identity: &Identity, required: Permissions) -> bool {
        match self {
            AccessPolicy::AllowAll => true,
            AccessPolicy::ReadOnly => (Permissions::READ | Permissions::LIST).contains(required),
            AccessPolicy::Identities(allowed) => allowed.iter().any(|a| a == identity.as_str()),
            AccessPolicy::DenyAll => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootConfig {
    pub name: String,
    /// Physical location; `~` and `$VAR` are expanded.
    pub location: String,
    #[serde(default)]
    pub access: AccessPolicy,
}

impl RootConfig {
    /// Expanded, resolved location. Missing directories stay unresolved
    /// but are still made absolute.
    pub fn expanded_location(&self) -> DriverResult<PathBuf> {
        let expanded = shellexpand::full(&self.location).map_err(|e| {
            DriverError::Config(format!("root '{}': cannot expand location: {}", self.name, e))
        })?;
        let path = PathBuf::from(expanded.into_owned());
        Ok(dunce::canonicalize(&path)
            .or_else(|_| std::path::absolute(&path))
            .unwrap_or(path))
    }

    pub fn to_root(&self) -> DriverResult<VirtualRoot> {
        Ok(VirtualRoot::new(
            self.name.clone(),
            self.expanded_location()?,
            self.access.clone(),
        ))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverConfig {
    #[serde(default)]
    pub roots: Vec<RootConfig>,
    /// INI file listing named data sources.
    #[serde(default)]
    pub data_sources: Option<PathBuf>,
}

impl DriverConfig {
    pub fn from_ron(text: &str) -> DriverResult<Self> {
        ron::from_str(text).map_err(|e| DriverError::Config(format!("RON parse error: {}", e)))
    }

    pub fn load(path: impl AsRef<Path>) -> DriverResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| DriverError::Config(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_ron(&text)?;
        tracing::debug!(path = %path.display(), roots = config.roots.len(), "loaded config");
        Ok(config)
    }

    /// Register every configured root, or none of them.
    ///
    /// All roots are expanded and checked for name clashes (with each other
    /// and with the registry) before the first one is registered.
    pub fn apply(&self, registry: &NamespaceRegistry) -> DriverResult<()> {
        let mut seen = HashSet::new();
        let mut roots = Vec::with_capacity(self.roots.len());
        for root in &self.roots {
            if !seen.insert(root.name.as_str()) || registry.contains(&root.name) {
                return Err(DriverError::DuplicateRoot(root.name.clone()));
            }
            roots.push(root.to_root()?);
        }

        for (index, root) in roots.into_iter().enumerate() {
            let location = root.location().display().to_string();
            if let Err(e) = registry.register(root) {
                // Lost a race with another registration; undo ours.
                for done in &self.roots[..index] {
                    let _ = registry.remove(&done.name);
                }
                return Err(e);
            }
            tracing::info!(root = %self.roots[index].name, %location, "registered root");
        }
        Ok(())
    }

    pub fn data_source_catalog(&self) -> Arc<dyn DataSourceCatalog> {
        match &self.data_sources {
            Some(path) => match shellexpand::full(&path.to_string_lossy()) {
                Ok(expanded) => Arc::new(IniDataSources::new(expanded.into_owned())),
                Err(_) => Arc::new(IniDataSources::new(path.clone())),
            },
            None => Arc::new(NoDataSources),
        }
    }
}
