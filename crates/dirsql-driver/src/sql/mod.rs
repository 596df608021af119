//! Query text front-end.
//!
//! Parses the constrained select grammar into a fixed-shape AST:
//!
//! ```text
//! SELECT <col>[, <col>...] | *
//!   FROM <path>[/*][, <path>[/*]...]
//!   [WHERE <cond> [AND|OR <cond>]...]
//! ```
//!
//! Keywords are case-insensitive; identifiers and paths may be
//! double-quoted; string values are single-quoted with backslash escapes.

mod ast;
mod parser;

pub use ast::{CompareOp, Comparison, Literal, Predicate, SelectItem, SelectQuery, TableRef};
pub use parser::parse_query;
