//! Driver error types.
//!
//! One enum covers the whole taxonomy. Namespace misses and authorization
//! denials are separate variants on purpose: callers may swallow the first
//! but must always surface the second.

use std::path::PathBuf;

use dirsql_types::{Identity, ResultError};
use strum::Display;
use thiserror::Error;

use crate::vfs::VfsError;

/// Driver error type.
#[derive(Debug, Error)]
pub enum DriverError {
    /// No virtual root with this name is registered.
    #[error("unknown root: {0}")]
    UnknownRoot(String),

    /// The root exists but the identity lacks the required permissions.
    #[error("access to {path} denied for {identity}")]
    Authorization { path: String, identity: Identity },

    /// A root with this name is already registered.
    #[error("root already registered: {0}")]
    DuplicateRoot(String),

    /// The physical target resolves outside its root's subtree.
    #[error("path escapes root: {0}")]
    PathEscapesRoot(String),

    /// Query text could not be parsed or planned.
    #[error("malformed query: {0}")]
    MalformedQuery(String),

    /// A column name outside the operation's vocabulary.
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    /// The operation has no meaning for this driver.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// Connection URL or properties are unusable.
    #[error("invalid connection: {0}")]
    InvalidConnection(String),

    /// A store read failed during traversal.
    #[error("I/O failure at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: VfsError,
    },

    /// The caller cancelled the operation.
    #[error("operation cancelled")]
    Cancelled,

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Copyable classification of a [`DriverError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ErrorKind {
    UnknownRoot,
    Authorization,
    DuplicateRoot,
    PathEscapesRoot,
    MalformedQuery,
    UnknownColumn,
    Unsupported,
    InvalidConnection,
    IoFailure,
    Cancelled,
    Config,
}

impl DriverError {
    pub fn unknown_root(name: impl Into<String>) -> Self {
        Self::UnknownRoot(name.into())
    }

    pub fn authorization(path: impl Into<String>, identity: &Identity) -> Self {
        Self::Authorization {
            path: path.into(),
            identity: identity.clone(),
        }
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedQuery(msg.into())
    }

    pub fn unknown_column(name: impl Into<String>) -> Self {
        Self::UnknownColumn(name.into())
    }

    pub fn unsupported(what: impl Into<String>) -> Self {
        Self::Unsupported(what.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: VfsError) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownRoot(_) => ErrorKind::UnknownRoot,
            Self::Authorization { .. } => ErrorKind::Authorization,
            Self::DuplicateRoot(_) => ErrorKind::DuplicateRoot,
            Self::PathEscapesRoot(_) => ErrorKind::PathEscapesRoot,
            Self::MalformedQuery(_) => ErrorKind::MalformedQuery,
            Self::UnknownColumn(_) => ErrorKind::UnknownColumn,
            Self::Unsupported(_) => ErrorKind::Unsupported,
            Self::InvalidConnection(_) => ErrorKind::InvalidConnection,
            Self::Io { .. } => ErrorKind::IoFailure,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// True for namespace misses, which callers may choose to suppress.
    ///
    /// Authorization failures are never "not found".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UnknownRoot(_))
    }
}

impl From<ResultError> for DriverError {
    fn from(e: ResultError) -> Self {
        // Row width mismatches are planning bugs surfaced as malformed plans.
        Self::MalformedQuery(e.to_string())
    }
}

/// Driver result type.
pub type DriverResult<T> = Result<T, DriverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_are_distinct() {
        let missing = DriverError::unknown_root("docs");
        let denied = DriverError::authorization("docs/a", &Identity::new("amy"));
        assert_eq!(missing.kind(), ErrorKind::UnknownRoot);
        assert_eq!(denied.kind(), ErrorKind::Authorization);
        assert!(missing.is_not_found());
        assert!(!denied.is_not_found());
    }

    #[test]
    fn test_messages() {
        let denied = DriverError::authorization("docs/a", &Identity::new("amy"));
        assert_eq!(denied.to_string(), "access to docs/a denied for amy");
        let io = DriverError::io("/srv/x", VfsError::not_found("/srv/x"));
        assert_eq!(io.kind(), ErrorKind::IoFailure);
        assert!(io.to_string().starts_with("I/O failure at /srv/x"));
    }
}
