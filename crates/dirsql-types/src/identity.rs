//! Caller identity and permission bits.
//!
//! Authorization is always asked as "does this identity hold these bits
//! on this root?". The identity itself is opaque to the driver.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Opaque caller identity (a session token, user name, or principal id).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identity(String);

impl Identity {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The identity used when a connection names no user.
    pub fn anonymous() -> Self {
        Self("anonymous".into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

bitflags! {
    /// Permission bits requested from a root's authorizer.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Permissions: u32 {
        /// Read entry attributes (queries).
        const READ = 0b0001;
        /// Enumerate catalog metadata (introspection).
        const LIST = 0b0010;
        /// Mutate entries. Never granted usefully: no mutation is supported.
        const WRITE = 0b0100;
    }
}

impl std::fmt::Display for Permissions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        bitflags::parser::to_writer(self, f)
    }
}
