//! Row filtering.
//!
//! A [`RowFilter`] is a predicate tree compiled once per query against the
//! store's case sensitivity. Evaluation is three-valued: a comparison
//! against a null value is unknown, and only rows whose predicate is
//! definitely true are kept.

use std::cmp::Ordering;
use std::str::FromStr;

use dirsql_types::Value;

use crate::error::DriverResult;
use crate::pattern::NamePattern;
use crate::plan::{FileColumn, PlanColumn};
use crate::sql::{CompareOp, Comparison, Literal, Predicate};

/// Compiled predicate tree.
#[derive(Debug, Clone)]
pub struct RowFilter {
    root: Node,
}

#[derive(Debug, Clone)]
enum Node {
    And(Box<Node>, Box<Node>),
    Or(Box<Node>, Box<Node>),
    Not(Box<Node>),
    Test(Test),
}

#[derive(Debug, Clone)]
struct Test {
    column: PlanColumn,
    check: Check,
}

#[derive(Debug, Clone)]
enum Check {
    /// `LIKE`, or `=` on a name column; `negate` for `NOT LIKE` / `<>`.
    Pattern { pattern: NamePattern, negate: bool },
    Ordered { op: CompareOp, operand: Operand },
}

#[derive(Debug, Clone)]
enum Operand {
    Text(String),
    Integer(i64),
}

impl RowFilter {
    /// Compile `predicate`; `case_sensitive` comes from the store.
    pub fn compile(predicate: &Predicate, case_sensitive: bool) -> DriverResult<Self> {
        Ok(Self {
            root: compile_node(predicate, case_sensitive)?,
        })
    }

    /// Evaluate against a row whose values `lookup` supplies.
    pub fn matches(&self, lookup: &dyn Fn(&PlanColumn) -> Value) -> bool {
        eval(&self.root, lookup) == Some(true)
    }
}

fn compile_node(predicate: &Predicate, case_sensitive: bool) -> DriverResult<Node> {
    Ok(match predicate {
        Predicate::And(l, r) => Node::And(
            Box::new(compile_node(l, case_sensitive)?),
            Box::new(compile_node(r, case_sensitive)?),
        ),
        Predicate::Or(l, r) => Node::Or(
            Box::new(compile_node(l, case_sensitive)?),
            Box::new(compile_node(r, case_sensitive)?),
        ),
        Predicate::Not(inner) => Node::Not(Box::new(compile_node(inner, case_sensitive)?)),
        Predicate::Compare(cmp) => Node::Test(compile_test(cmp, case_sensitive)?),
    })
}

fn compile_test(cmp: &Comparison, case_sensitive: bool) -> DriverResult<Test> {
    let column = match FileColumn::from_str(&cmp.column) {
        Ok(c) => PlanColumn::File(c),
        Err(_) => PlanColumn::Field(cmp.column.clone()),
    };
    let name_column = matches!(column, PlanColumn::File(c) if c.is_pattern_column());

    let check = match (cmp.op, &cmp.value) {
        (CompareOp::Like | CompareOp::NotLike, Literal::Text(raw)) => Check::Pattern {
            pattern: NamePattern::like(raw, case_sensitive)?,
            negate: cmp.op == CompareOp::NotLike,
        },
        (CompareOp::Eq | CompareOp::NotEq, literal) if name_column => Check::Pattern {
            pattern: NamePattern::exact(&literal.unescaped(), case_sensitive)?,
            negate: cmp.op == CompareOp::NotEq,
        },
        (op, Literal::Integer(n)) if column == PlanColumn::File(FileColumn::Length) => {
            Check::Ordered {
                op,
                operand: Operand::Integer(*n),
            }
        }
        (op, literal) => Check::Ordered {
            op,
            operand: Operand::Text(literal.unescaped()),
        },
    };
    Ok(Test { column, check })
}

fn eval(node: &Node, lookup: &dyn Fn(&PlanColumn) -> Value) -> Option<bool> {
    match node {
        Node::And(l, r) => match (eval(l, lookup), eval(r, lookup)) {
            (Some(false), _) | (_, Some(false)) => Some(false),
            (Some(true), Some(true)) => Some(true),
            _ => None,
        },
        Node::Or(l, r) => match (eval(l, lookup), eval(r, lookup)) {
            (Some(true), _) | (_, Some(true)) => Some(true),
            (Some(false), Some(false)) => Some(false),
            _ => None,
        },
        Node::Not(inner) => eval(inner, lookup).map(|b| !b),
        Node::Test(test) => test.eval(&lookup(&test.column)),
    }
}

impl Test {
    fn eval(&self, value: &Value) -> Option<bool> {
        match &self.check {
            Check::Pattern { pattern, negate } => {
                let text = value_text(value)?;
                Some(pattern.matches(&text) != *negate)
            }
            Check::Ordered { op, operand } => {
                let ordering = match (operand, value) {
                    (_, Value::Null) => return None,
                    (Operand::Integer(n), Value::Integer(v)) => v.cmp(n),
                    (Operand::Integer(n), other) => value_text(other)?.as_str().cmp(n.to_string().as_str()),
                    (Operand::Text(t), other) => value_text(other)?.as_str().cmp(t.as_str()),
                };
                Some(apply(*op, ordering))
            }
        }
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Blob(_) => None,
        Value::Text(s) => Some(s.clone()),
        Value::Integer(n) => Some(n.to_string()),
    }
}

fn apply(op: CompareOp, ordering: Ordering) -> bool {
    match op {
        CompareOp::Eq => ordering == Ordering::Equal,
        CompareOp::NotEq => ordering != Ordering::Equal,
        CompareOp::Lt => ordering == Ordering::Less,
        CompareOp::Le => ordering != Ordering::Greater,
        CompareOp::Gt => ordering == Ordering::Greater,
        CompareOp::Ge => ordering != Ordering::Less,
        // LIKE always compiles to a pattern check.
        CompareOp::Like | CompareOp::NotLike => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::parse_query;

    fn filter(where_clause: &str, case_sensitive: bool) -> RowFilter {
        let q = parse_query(&format!("SELECT name FROM d WHERE {where_clause}")).unwrap();
        RowFilter::compile(q.predicate.as_ref().unwrap(), case_sensitive).unwrap()
    }

    fn row(name: &str, length: i64) -> impl Fn(&PlanColumn) -> Value {
        let name = name.to_string();
        move |column: &PlanColumn| match column {
            PlanColumn::File(FileColumn::Name) => Value::from(name.as_str()),
            PlanColumn::File(FileColumn::Path) => Value::from("docs"),
            PlanColumn::File(FileColumn::Length) => Value::Integer(length),
            PlanColumn::File(FileColumn::Modified) => Value::from("2024-03-01 12:00:00:0000"),
            _ => Value::Null,
        }
    }

    #[test]
    fn test_like() {
        let f = filter("name LIKE '%.xml'", true);
        assert!(f.matches(&row("a.xml", 1)));
        assert!(!f.matches(&row("b.txt", 1)));

        let f = filter("name NOT LIKE '%.xml'", true);
        assert!(!f.matches(&row("a.xml", 1)));
        assert!(f.matches(&row("b.txt", 1)));
    }

    #[test]
    fn test_name_equality_follows_case_sensitivity() {
        assert!(!filter("name = 'A.XML'", true).matches(&row("a.xml", 0)));
        assert!(filter("name = 'A.XML'", false).matches(&row("a.xml", 0)));
        assert!(filter("name <> 'A.XML'", true).matches(&row("a.xml", 0)));
    }

    #[test]
    fn test_numeric_length() {
        let f = filter("length > 9", true);
        assert!(f.matches(&row("x", 10)));
        // Numeric, not lexical: "10" < "9" as text.
        assert!(!f.matches(&row("x", 9)));
        assert!(filter("length <= 9", true).matches(&row("x", 2)));
    }

    #[test]
    fn test_modified_is_lexical() {
        assert!(filter("modified >= '2024-01-01'", true).matches(&row("x", 0)));
        assert!(!filter("modified < '2024-01-01'", true).matches(&row("x", 0)));
    }

    #[test]
    fn test_boolean_composition() {
        let f = filter("name LIKE 'a%' AND (length > 5 OR name = 'a.txt')", true);
        assert!(f.matches(&row("a.txt", 1)));
        assert!(f.matches(&row("abc", 6)));
        assert!(!f.matches(&row("abc", 5)));
        assert!(!f.matches(&row("b.txt", 50)));

        let f = filter("NOT name LIKE 'a%'", true);
        assert!(f.matches(&row("b", 0)));
        assert!(!f.matches(&row("a", 0)));
    }

    #[test]
    fn test_null_comparisons_are_unknown() {
        let f = filter("contents = 'x'", true);
        assert!(!f.matches(&row("a", 0)));
        // NOT unknown is still unknown.
        let f = filter("NOT contents = 'x'", true);
        assert!(!f.matches(&row("a", 0)));
        // But OR with a true branch is true.
        let f = filter("contents = 'x' OR name = 'a'", true);
        assert!(f.matches(&row("a", 0)));
    }
}
