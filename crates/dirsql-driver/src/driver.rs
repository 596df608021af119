//! Driver front door.
//!
//! A [`Driver`] owns the collaborators every session shares (the registry,
//! the store, the field extractor, the data-source list) and turns a
//! connection URL plus properties into a [`Session`]. The URL prefix picks
//! the [`Flavor`] once; it is never re-inspected afterwards.

use std::collections::BTreeMap;
use std::sync::Arc;

use dirsql_types::Identity;

use crate::config::DriverConfig;
use crate::datasources::{DataSource, DataSourceCatalog, NoDataSources};
use crate::error::{DriverError, DriverResult};
use crate::flavor::Flavor;
use crate::registry::{NamespaceRegistry, SharedRegistry};
use crate::resolver::{CatalogPath, PathResolver};
use crate::session::Session;
use crate::traversal::TraversalEngine;
use crate::vfs::{LocalBackend, VfsOps};
use crate::xml::{ElementPathExtractor, FieldExtractor};

/// Property naming the catalog a session is bound to.
pub const CATALOG_PROPERTY: &str = "catalog";
/// Property carrying the caller's identity token.
pub const USER_PROPERTY: &str = "user";
/// Property requesting a read-only session (`true` unless set otherwise).
pub const READONLY_PROPERTY: &str = "readonly";

/// String-keyed connection properties. Keys are case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionProperties {
    values: BTreeMap<String, String>,
}

impl ConnectionProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_ascii_lowercase(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(&key.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn catalog(&self) -> Option<&str> {
        self.get(CATALOG_PROPERTY).filter(|c| !c.trim().is_empty())
    }

    pub fn identity(&self) -> Identity {
        match self.get(USER_PROPERTY) {
            Some(user) if !user.trim().is_empty() => Identity::new(user.trim()),
            _ => Identity::anonymous(),
        }
    }

    pub fn read_only(&self) -> DriverResult<bool> {
        match self.get(READONLY_PROPERTY).map(|v| v.trim().to_ascii_lowercase()) {
            None => Ok(true),
            Some(v) => match v.as_str() {
                "true" | "1" | "yes" => Ok(true),
                "false" | "0" | "no" => Ok(false),
                other => Err(DriverError::InvalidConnection(format!(
                    "readonly must be true or false, got '{}'",
                    other
                ))),
            },
        }
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for ConnectionProperties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut props = Self::new();
        for (k, v) in iter {
            props.set(k.as_ref(), v);
        }
        props
    }
}

/// Entry point: URL dispatch and session creation.
#[derive(Clone)]
pub struct Driver {
    registry: SharedRegistry,
    fs: Arc<dyn VfsOps>,
    extractor: Arc<dyn FieldExtractor>,
    data_sources: Arc<dyn DataSourceCatalog>,
}

impl std::fmt::Debug for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Driver")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl Driver {
    /// Driver over the host file system.
    pub fn new(registry: SharedRegistry) -> Self {
        Self {
            registry,
            fs: Arc::new(LocalBackend::new()),
            extractor: Arc::new(ElementPathExtractor),
            data_sources: Arc::new(NoDataSources),
        }
    }

    /// Driver with a fresh registry populated from `config`.
    pub fn from_config(config: &DriverConfig) -> DriverResult<Self> {
        let registry = NamespaceRegistry::shared();
        config.apply(&registry)?;
        Ok(Self::new(registry).with_data_sources(config.data_source_catalog()))
    }

    pub fn with_fs(mut self, fs: Arc<dyn VfsOps>) -> Self {
        self.fs = fs;
        self
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn FieldExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_data_sources(mut self, data_sources: Arc<dyn DataSourceCatalog>) -> Self {
        self.data_sources = data_sources;
        self
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    pub fn accepts_url(&self, url: &str) -> bool {
        Flavor::from_url(url).is_some()
    }

    /// Open a session, or `Ok(None)` if the URL belongs to another driver.
    ///
    /// The bound catalog comes from the `catalog` property, falling back
    /// to whatever follows the URL prefix (`dirsql:file:docs`).
    pub fn connect(
        &self,
        url: &str,
        properties: &ConnectionProperties,
    ) -> DriverResult<Option<Session>> {
        let Some(flavor) = Flavor::from_url(url) else {
            return Ok(None);
        };

        let url_tail = url.trim().get(flavor.url_prefix().len()..).unwrap_or_default();
        let catalog = properties
            .catalog()
            .or_else(|| (!url_tail.trim().is_empty()).then_some(url_tail))
            .ok_or_else(|| {
                DriverError::InvalidConnection(format!("missing '{}' property", CATALOG_PROPERTY))
            })?;
        let bound = CatalogPath::parse(catalog)
            .map_err(|_| DriverError::InvalidConnection(format!("bad catalog '{}'", catalog)))?;
        if !self.registry.contains(bound.root()) {
            return Err(DriverError::unknown_root(bound.root()));
        }

        let identity = properties.identity();
        let read_only = properties.read_only()?;
        tracing::info!(%flavor, catalog = %bound, %identity, read_only, "session opened");

        Ok(Some(Session::new(
            flavor,
            bound.to_string(),
            identity,
            read_only,
            PathResolver::new(self.registry.clone(), self.fs.clone()),
            TraversalEngine::new(self.fs.clone(), self.extractor.clone()),
        )))
    }

    /// Named data sources known to the environment.
    pub fn data_sources(&self) -> Vec<DataSource> {
        self.data_sources.data_sources()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{AllowAll, VirtualRoot};
    use crate::vfs::MemoryBackend;

    fn driver() -> Driver {
        let registry = NamespaceRegistry::shared();
        registry
            .register(VirtualRoot::new("docs", "/srv/docs", AllowAll))
            .unwrap();
        Driver::new(registry).with_fs(Arc::new(MemoryBackend::new()))
    }

    #[test]
    fn test_foreign_url_is_not_ours() {
        let props = ConnectionProperties::new().with("catalog", "docs");
        assert!(driver().connect("jdbc:odbc:x", &props).unwrap().is_none());
        assert!(!driver().accepts_url("jdbc:odbc:x"));
        assert!(driver().accepts_url("dirsql:xml:"));
    }

    #[test]
    fn test_connect_binds_catalog_and_identity() {
        let props: ConnectionProperties =
            [("Catalog", "docs/sub"), ("USER", "amy")].into_iter().collect();
        let session = driver().connect("dirsql:xml:", &props).unwrap().unwrap();
        assert_eq!(session.flavor(), Flavor::XmlBacked);
        assert_eq!(session.bound_root(), "docs/sub");
        assert_eq!(session.identity(), &Identity::new("amy"));
        assert!(session.is_read_only());
        session.close();
    }

    #[test]
    fn test_catalog_from_url_tail() {
        let session = driver()
            .connect("dirsql:file:docs", &ConnectionProperties::new())
            .unwrap()
            .unwrap();
        assert_eq!(session.bound_root(), "docs");
        assert_eq!(session.identity(), &Identity::anonymous());
    }

    #[test]
    fn test_connect_errors() {
        let err = driver()
            .connect("dirsql:file:", &ConnectionProperties::new())
            .unwrap_err();
        assert!(matches!(err, DriverError::InvalidConnection(_)));

        let props = ConnectionProperties::new().with("catalog", "nope");
        let err = driver().connect("dirsql:file:", &props).unwrap_err();
        assert!(matches!(err, DriverError::UnknownRoot(_)));

        let props = ConnectionProperties::new()
            .with("catalog", "docs")
            .with("readonly", "maybe");
        let err = driver().connect("dirsql:file:", &props).unwrap_err();
        assert!(matches!(err, DriverError::InvalidConnection(_)));
    }

    #[test]
    fn test_readonly_false_is_recorded() {
        let props = ConnectionProperties::new()
            .with("catalog", "docs")
            .with("readonly", "false");
        let session = driver().connect("dirsql:file:", &props).unwrap().unwrap();
        assert!(!session.is_read_only());
        let err = session.execute_update("DELETE FROM docs").unwrap_err();
        assert!(matches!(err, DriverError::Unsupported(_)));
    }
}
