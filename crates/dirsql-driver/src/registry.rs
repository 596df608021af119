//! Namespace registry: symbolic root name → physical location + authorizer.
//!
//! The registry is an explicit object handed to the [`Driver`](crate::Driver)
//! at construction; there is no process global.
//!
//! # Locking
//!
//! Mutations (`register`, `remove`, `rename`) serialize on one mutex and
//! publish a fresh copy-on-write snapshot of the table. Lookups only clone
//! the current snapshot `Arc` under a brief read lock, so they never wait on
//! a mutation in progress and never hold a lock while the caller does I/O.
//! `rename` swaps old and new bindings in a single publish, so a concurrent
//! lookup observes either the old or the new binding, never neither.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dirsql_types::{Identity, Permissions};
use parking_lot::{Mutex, RwLock};

use crate::error::{DriverError, DriverResult};

/// Authorization predicate attached to a root.
pub trait Authorize: Send + Sync {
    /// Whether `identity` holds every bit of `required` on this root.
    fn authorize(&self, identity: &Identity, required: Permissions) -> bool;
}

impl<F> Authorize for F
where
    F: Fn(&Identity, Permissions) -> bool + Send + Sync,
{
    fn authorize(&self, identity: &Identity, required: Permissions) -> bool {
        self(identity, required)
    }
}

/// Grants everything to everyone.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Authorize for AllowAll {
    fn authorize(&self, _identity: &Identity, _required: Permissions) -> bool {
        true
    }
}

/// Grants a fixed set of permissions to everyone.
#[derive(Debug, Clone, Copy)]
pub struct Grant(pub Permissions);

impl Authorize for Grant {
    fn authorize(&self, _identity: &Identity, required: Permissions) -> bool {
        self.0.contains(required)
    }
}

/// A named, access-controlled mount point.
#[derive(Clone)]
pub struct VirtualRoot {
    name: String,
    location: PathBuf,
    authorizer: Arc<dyn Authorize>,
}

impl std::fmt::Debug for VirtualRoot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualRoot")
            .field("name", &self.name)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl VirtualRoot {
    /// A relative `location` is made absolute against the current directory.
    pub fn new(
        name: impl Into<String>,
        location: impl Into<PathBuf>,
        authorizer: impl Authorize + 'static,
    ) -> Self {
        let location = location.into();
        Self {
            name: name.into(),
            location: std::path::absolute(&location).unwrap_or(location),
            authorizer: Arc::new(authorizer),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn authorize(&self, identity: &Identity, required: Permissions) -> bool {
        self.authorizer.authorize(identity, required)
    }
}

pub type RootTable = BTreeMap<String, Arc<VirtualRoot>>;

/// Process-wide table of virtual roots.
pub struct NamespaceRegistry {
    /// Serializes mutations.
    writer: Mutex<()>,
    /// Current published snapshot.
    table: RwLock<Arc<RootTable>>,
}

/// Shared handle to a registry.
pub type SharedRegistry = Arc<NamespaceRegistry>;

impl std::fmt::Debug for NamespaceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamespaceRegistry")
            .field("roots", &self.names())
            .finish()
    }
}

impl Default for NamespaceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceRegistry {
    pub fn new() -> Self {
        Self {
            writer: Mutex::new(()),
            table: RwLock::new(Arc::new(BTreeMap::new())),
        }
    }

    /// Create a registry wrapped for sharing.
    pub fn shared() -> SharedRegistry {
        Arc::new(Self::new())
    }

    /// Consistent view of every binding at one instant.
    pub fn snapshot(&self) -> Arc<RootTable> {
        Arc::clone(&self.table.read())
    }

    fn publish(&self, table: RootTable) {
        *self.table.write() = Arc::new(table);
    }

    /// Register a root. Fails if the name is taken.
    pub fn register(&self, root: VirtualRoot) -> DriverResult<()> {
        let _guard = self.writer.lock();
        let mut table = (*self.snapshot()).clone();
        if table.contains_key(root.name()) {
            return Err(DriverError::DuplicateRoot(root.name().to_string()));
        }
        tracing::debug!(root = root.name(), location = %root.location().display(), "registering root");
        table.insert(root.name().to_string(), Arc::new(root));
        self.publish(table);
        Ok(())
    }

    /// Remove a root, returning it.
    pub fn remove(&self, name: &str) -> DriverResult<Arc<VirtualRoot>> {
        let _guard = self.writer.lock();
        let mut table = (*self.snapshot()).clone();
        let removed = table
            .remove(name)
            .ok_or_else(|| DriverError::unknown_root(name))?;
        tracing::debug!(root = name, "removed root");
        self.publish(table);
        Ok(removed)
    }

    /// Replace the binding `old_name` with `root` in one visible step.
    ///
    /// Returns the removed root. Fails without changes if `old_name` is
    /// absent or if `root`'s name is taken by a different binding.
    pub fn rename(&self, old_name: &str, root: VirtualRoot) -> DriverResult<Arc<VirtualRoot>> {
        let _guard = self.writer.lock();
        let mut table = (*self.snapshot()).clone();
        if root.name() != old_name && table.contains_key(root.name()) {
            return Err(DriverError::DuplicateRoot(root.name().to_string()));
        }
        let removed = table
            .remove(old_name)
            .ok_or_else(|| DriverError::unknown_root(old_name))?;
        tracing::debug!(from = old_name, to = root.name(), "renamed root");
        table.insert(root.name().to_string(), Arc::new(root));
        self.publish(table);
        Ok(removed)
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<VirtualRoot>> {
        self.table.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.read().contains_key(name)
    }

    /// Registered names in ascending ordinal order.
    pub fn names(&self) -> Vec<String> {
        self.snapshot().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.table.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
