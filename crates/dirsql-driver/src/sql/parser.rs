//! winnow grammar for the select surface.

use winnow::ascii::{digit1, multispace0};
use winnow::combinator::{alt, cut_err, delimited, opt, preceded, repeat, separated};
use winnow::error::{ContextError, StrContext};
use winnow::prelude::*;
use winnow::token::{any, none_of, take_while};

use super::ast::{CompareOp, Comparison, Literal, Predicate, SelectItem, SelectQuery, TableRef};
use crate::error::{DriverError, DriverResult};

/// Parse query text into a [`SelectQuery`].
///
/// Any syntax error is a [`DriverError::MalformedQuery`] carrying the byte
/// offset where parsing stopped.
pub fn parse_query(text: &str) -> DriverResult<SelectQuery> {
    query.parse(text).map_err(|e| {
        DriverError::malformed(format!("syntax error at offset {}: {}", e.offset(), e.inner()))
    })
}

fn query(input: &mut &str) -> PResult<SelectQuery> {
    ws(keyword("select")).parse_next(input)?;
    let select = select_list
        .context(StrContext::Label("select list"))
        .parse_next(input)?;
    ws(keyword("from")).parse_next(input)?;
    let from: Vec<TableRef> = separated(1.., ws(table_ref), ',')
        .context(StrContext::Label("from list"))
        .parse_next(input)?;
    let predicate = opt(preceded(
        ws(keyword("where")),
        cut_err(or_expr.context(StrContext::Label("where clause"))),
    ))
    .parse_next(input)?;
    (multispace0, opt(';'), multispace0).parse_next(input)?;
    Ok(SelectQuery {
        select,
        from,
        predicate,
    })
}

fn select_list(input: &mut &str) -> PResult<Vec<SelectItem>> {
    alt((
        ws('*').value(vec![SelectItem::Wildcard]),
        separated(1.., ws(identifier).map(SelectItem::Column), ','),
    ))
    .parse_next(input)
}

fn table_ref(input: &mut &str) -> PResult<TableRef> {
    alt((quoted_identifier, bare_path.map(str::to_string)))
        .map(TableRef::new)
        .parse_next(input)
}

fn bare_path<'s>(input: &mut &'s str) -> PResult<&'s str> {
    take_while(1.., |c: char| {
        !c.is_whitespace() && !matches!(c, ',' | ';' | '"' | '\'' | '(' | ')')
    })
    .parse_next(input)
}

// ============================================================================
// Predicates: OR < AND < NOT < comparison / parentheses
// ============================================================================

fn or_expr(input: &mut &str) -> PResult<Predicate> {
    let first = and_expr.parse_next(input)?;
    let rest: Vec<Predicate> =
        repeat(0.., preceded(ws(keyword("or")), and_expr)).parse_next(input)?;
    Ok(rest.into_iter().fold(first, Predicate::or))
}

fn and_expr(input: &mut &str) -> PResult<Predicate> {
    let first = unary.parse_next(input)?;
    let rest: Vec<Predicate> =
        repeat(0.., preceded(ws(keyword("and")), unary)).parse_next(input)?;
    Ok(rest.into_iter().fold(first, Predicate::and))
}

fn unary(input: &mut &str) -> PResult<Predicate> {
    alt((
        preceded(ws(keyword("not")), unary).map(Predicate::not),
        delimited(ws('('), or_expr, ws(')')),
        comparison,
    ))
    .parse_next(input)
}

fn comparison(input: &mut &str) -> PResult<Predicate> {
    let column = ws(identifier).parse_next(input)?;
    let op = ws(compare_op).parse_next(input)?;
    let value = ws(literal)
        .context(StrContext::Label("comparison value"))
        .parse_next(input)?;
    Ok(Predicate::Compare(Comparison { column, op, value }))
}

fn compare_op(input: &mut &str) -> PResult<CompareOp> {
    alt((
        "<=".value(CompareOp::Le),
        ">=".value(CompareOp::Ge),
        "<>".value(CompareOp::NotEq),
        "!=".value(CompareOp::NotEq),
        "=".value(CompareOp::Eq),
        "<".value(CompareOp::Lt),
        ">".value(CompareOp::Gt),
        keyword("like").value(CompareOp::Like),
        (keyword("not"), multispace0, keyword("like")).value(CompareOp::NotLike),
    ))
    .parse_next(input)
}

// ============================================================================
// Tokens
// ============================================================================

fn literal(input: &mut &str) -> PResult<Literal> {
    alt((
        string_literal.map(Literal::Text),
        integer_literal.map(Literal::Integer),
    ))
    .parse_next(input)
}

fn integer_literal(input: &mut &str) -> PResult<i64> {
    (opt('-'), digit1.try_map(|d: &str| d.parse::<i64>()))
        .map(|(sign, n)| if sign.is_some() { -n } else { n })
        .parse_next(input)
}

#[derive(Debug, Clone)]
enum Piece {
    /// `''` inside a string.
    Quote,
    /// Backslash plus the escaped char; kept verbatim for LIKE translation.
    Escaped(char),
    Char(char),
}

fn string_literal(input: &mut &str) -> PResult<String> {
    let pieces: Vec<Piece> = delimited(
        '\'',
        repeat(
            0..,
            alt((
                "''".value(Piece::Quote),
                preceded('\\', any).map(Piece::Escaped),
                none_of('\'').map(Piece::Char),
            )),
        ),
        '\'',
    )
    .parse_next(input)?;

    let mut out = String::new();
    for piece in pieces {
        match piece {
            Piece::Quote => out.push('\''),
            Piece::Escaped(c) => {
                out.push('\\');
                out.push(c);
            }
            Piece::Char(c) => out.push(c),
        }
    }
    Ok(out)
}

fn identifier(input: &mut &str) -> PResult<String> {
    alt((quoted_identifier, word.map(str::to_string))).parse_next(input)
}

fn quoted_identifier(input: &mut &str) -> PResult<String> {
    delimited(
        '"',
        repeat(0.., alt(("\"\"".value('"'), none_of('"')))),
        '"',
    )
    .parse_next(input)
}

fn word<'s>(input: &mut &'s str) -> PResult<&'s str> {
    take_while(1.., |c: char| c.is_alphanumeric() || c == '_').parse_next(input)
}

fn keyword<'s>(kw: &'static str) -> impl Parser<&'s str, &'s str, ContextError> {
    word.verify(move |w: &str| w.eq_ignore_ascii_case(kw))
}

fn ws<'s, O, P>(inner: P) -> impl Parser<&'s str, O, ContextError>
where
    P: Parser<&'s str, O, ContextError>,
{
    delimited(multispace0, inner, multispace0)
}
