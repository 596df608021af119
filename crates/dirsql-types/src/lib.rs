//! Shared result and identity types for dirsql.
//!
//! This crate is the tabular foundation: column descriptors, cell values,
//! the column-oriented [`TabularResult`], and the identity/permission pair
//! that every authorization decision is made over. It has **no internal
//! dependencies**; the driver builds on it.
//!
//! # Key Types
//!
//! |----------------------|---------------------------------------------|
//! | Type                 | Purpose                                     |
//! |----------------------|---------------------------------------------|
//! | [`TypeTag`]          | Semantic type of a column                   |
//! | [`ColumnDescriptor`] | Name + type tag + display size              |
//! | [`Value`]            | One cell                                    |
//! | [`TabularResult`]    | Immutable columnar answer shape             |
//! | [`Identity`]         | Opaque caller identity                      |
//! | [`Permissions`]      | Bitmask of required/granted rights          |
//! |----------------------|---------------------------------------------|

pub mod column;
pub mod identity;
pub mod result;
pub mod value;

pub use column::{ColumnDescriptor, TypeTag};
pub use identity::{Identity, Permissions};
pub use result::{ResultError, Row, TabularResult, TabularResultBuilder};
pub use value::Value;
