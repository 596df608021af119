//! Query AST.

use serde::{Deserialize, Serialize};
use strum::Display;

/// A parsed `SELECT`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectQuery {
    pub select: Vec<SelectItem>,
    pub from: Vec<TableRef>,
    pub predicate: Option<Predicate>,
}

/// One projection item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectItem {
    /// `*`
    Wildcard,
    Column(String),
}

/// One `FROM` item. `path` is `None` when the reference carries no path
/// text (an empty quoted identifier).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRef {
    pub path: Option<String>,
}

impl TableRef {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            path: (!path.is_empty()).then_some(path),
        }
    }
}

/// Boolean filter tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Predicate {
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Not(Box<Predicate>),
    Compare(Comparison),
}

impl Predicate {
    pub fn and(left: Predicate, right: Predicate) -> Self {
        Self::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Predicate, right: Predicate) -> Self {
        Self::Or(Box::new(left), Box::new(right))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(inner: Predicate) -> Self {
        Self::Not(Box::new(inner))
    }

    /// Every comparison in the tree, left to right.
    pub fn comparisons(&self) -> Vec<&Comparison> {
        let mut out = Vec::new();
        self.collect_comparisons(&mut out);
        out
    }

    fn collect_comparisons<'a>(&'a self, out: &mut Vec<&'a Comparison>) {
        match self {
            Predicate::And(l, r) | Predicate::Or(l, r) => {
                l.collect_comparisons(out);
                r.collect_comparisons(out);
            }
            Predicate::Not(inner) => inner.collect_comparisons(out),
            Predicate::Compare(c) => out.push(c),
        }
    }
}

/// `<column> <op> <value>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    pub column: String,
    pub op: CompareOp,
    pub value: Literal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum CompareOp {
    #[strum(serialize = "=")]
    Eq,
    #[strum(serialize = "<>")]
    NotEq,
    #[strum(serialize = "<")]
    Lt,
    #[strum(serialize = "<=")]
    Le,
    #[strum(serialize = ">")]
    Gt,
    #[strum(serialize = ">=")]
    Ge,
    #[strum(serialize = "LIKE")]
    Like,
    #[strum(serialize = "NOT LIKE")]
    NotLike,
}

/// Comparison operand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Literal {
    /// Single-quoted text, backslash escapes still in place.
    Text(String),
    Integer(i64),
}

impl Literal {
    /// Text with backslash escapes removed (`\x` → `x`).
    pub fn unescaped(&self) -> String {
        match self {
            Literal::Text(raw) => {
                let mut out = String::with_capacity(raw.len());
                let mut chars = raw.chars();
                while let Some(c) = chars.next() {
                    if c == '\\' {
                        if let Some(next) = chars.next() {
                            out.push(next);
                            continue;
                        }
                    }
                    out.push(c);
                }
                out
            }
            Literal::Integer(n) => n.to_string(),
        }
    }
}
