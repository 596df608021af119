//! Sessions: one bound root, one identity, one flavor.

use dirsql_types::{Identity, Permissions, TabularResult, TabularResultBuilder};
use tokio_util::sync::CancellationToken;

use crate::catalog::CatalogService;
use crate::error::{DriverError, DriverResult};
use crate::filter::RowFilter;
use crate::flavor::Flavor;
use crate::plan::{QueryPlan, QueryTranslator};
use crate::resolver::PathResolver;
use crate::sql::parse_query;
use crate::traversal::{TraversalEngine, TraversalOptions, TraversalSource};

/// A connected caller.
///
/// Holds no backing-store state: closing (or dropping) a session only
/// frees memory.
#[derive(Debug)]
pub struct Session {
    flavor: Flavor,
    bound_root: String,
    identity: Identity,
    read_only: bool,
    resolver: PathResolver,
    engine: TraversalEngine,
}

impl Session {
    pub(crate) fn new(
        flavor: Flavor,
        bound_root: String,
        identity: Identity,
        read_only: bool,
        resolver: PathResolver,
        engine: TraversalEngine,
    ) -> Self {
        Self {
            flavor,
            bound_root,
            identity,
            read_only,
            resolver,
            engine,
        }
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    /// Catalog the session was opened on; the default for introspection.
    pub fn bound_root(&self) -> &str {
        &self.bound_root
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Run a `SELECT` to completion.
    pub fn execute_query(&self, text: &str) -> DriverResult<TabularResult> {
        self.execute_query_with_cancel(text, &CancellationToken::new())
    }

    /// Run a `SELECT`, checking `cancel` between directory reads.
    #[tracing::instrument(skip(self, cancel), name = "session.execute_query", fields(root = %self.bound_root))]
    pub fn execute_query_with_cancel(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> DriverResult<TabularResult> {
        let query = parse_query(text)?;
        let plan = QueryTranslator::new(self.flavor).translate(&query)?;
        self.execute_plan(&plan, cancel)
    }

    /// Run an already-translated plan.
    pub fn execute_plan(
        &self,
        plan: &QueryPlan,
        cancel: &CancellationToken,
    ) -> DriverResult<TabularResult> {
        // Resolve everything up front: namespace and authorization failures
        // surface before any I/O happens.
        let sources = plan
            .sources
            .iter()
            .map(|source| {
                let resolved =
                    self.resolver
                        .resolve(&source.catalog, &self.identity, Permissions::READ)?;
                Ok(TraversalSource {
                    catalog: resolved.catalog,
                    physical: resolved.physical,
                    recursive: source.recursive,
                    confine: resolved.confine,
                })
            })
            .collect::<DriverResult<Vec<_>>>()?;

        let mut options = TraversalOptions::new(plan.flavor);
        options.cancel = cancel.clone();
        options.extract_fields = plan.flavor == Flavor::XmlBacked && plan.needs_fields();
        options.row_filter = plan
            .predicate
            .as_ref()
            .map(|p| RowFilter::compile(p, self.engine.case_sensitive()))
            .transpose()?;

        let mut enumeration = self.engine.enumerate(&sources, &options)?;
        let seen_fields = std::mem::take(&mut enumeration.field_paths);
        let entries = enumeration.into_result()?;

        for field in plan.field_columns() {
            if !seen_fields.contains(field) {
                return Err(DriverError::unknown_column(field));
            }
        }

        let mut out = TabularResultBuilder::new(plan.descriptors());
        for entry in &entries {
            out.push_row(plan.columns.iter().map(|c| entry.value(c)).collect())?;
        }
        let result = out.build();
        tracing::debug!(rows = result.row_count(), "query complete");
        Ok(result)
    }

    /// Data modification is never supported.
    pub fn execute_update(&self, _text: &str) -> DriverResult<u64> {
        Err(DriverError::unsupported("data modification"))
    }

    /// Introspection bound to this session.
    pub fn metadata(&self) -> CatalogService {
        CatalogService::new(
            self.resolver.clone(),
            self.engine.clone(),
            self.flavor,
            self.identity.clone(),
            self.bound_root.clone(),
        )
    }

    pub fn close(self) {
        tracing::debug!(root = %self.bound_root, identity = %self.identity, "session closed");
    }
}
