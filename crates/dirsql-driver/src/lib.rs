//! # dirsql-driver
//!
//! Virtual query driver: a small SQL surface over directory trees and XML
//! documents.
//!
//! Everything starts at a [`Driver`]:
//! - It owns a [`NamespaceRegistry`] mapping root names to physical
//!   locations and authorization predicates
//! - `connect(url, properties)` picks a [`Flavor`] from the URL and hands
//!   back a [`Session`] bound to one catalog and one identity
//! - Sessions run `SELECT`s through the translator, resolver and traversal
//!   engine, and answer introspection through a [`CatalogService`]
//!
//! Every answer is a [`TabularResult`](dirsql_types::TabularResult).

pub mod catalog;
pub mod config;
pub mod datasources;
pub mod driver;
pub mod error;
pub mod filter;
pub mod flavor;
pub mod pattern;
pub mod plan;
pub mod registry;
pub mod resolver;
pub mod session;
pub mod sql;
pub mod traversal;
pub mod vfs;
pub mod xml;

pub use catalog::{CatalogService, Introspection};
pub use config::{AccessPolicy, DriverConfig, RootConfig};
pub use datasources::{DataSource, DataSourceCatalog, IniDataSources, NoDataSources};
pub use driver::{ConnectionProperties, Driver};
pub use error::{DriverError, DriverResult, ErrorKind};
pub use flavor::{Flavor, TableType};
pub use pattern::NamePattern;
pub use plan::{FileColumn, PlanColumn, QueryPlan, QueryTranslator};
pub use registry::{AllowAll, Authorize, Grant, NamespaceRegistry, SharedRegistry, VirtualRoot};
pub use resolver::{CatalogPath, PathResolver, Resolved};
pub use session::Session;
pub use traversal::{EntryRecord, Enumeration, TraversalEngine, TraversalOptions};
pub use vfs::{
    backends::{LocalBackend, MemoryBackend},
    DirEntry, FileAttr, FileType, VfsError, VfsOps, VfsResult,
};
pub use xml::{ElementPathExtractor, FieldExtractor, XmlField};

pub use tokio_util::sync::CancellationToken;
