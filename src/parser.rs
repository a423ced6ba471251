use std::cell::RefCell;
use std::rc::Rc;

use thiserror::Error;

use crate::Span;
use crate::environment::Environment;
use crate::types::{Expr, Node, Op};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unsupported operator '{op}'")]
    UnsupportedOperator { op: String, span: Span },
    #[error("expression is missing an operator")]
    MissingOperator { span: Span },
    #[error("expected a parenthesized expression")]
    ExpectedParenthesized { span: Span },
    #[error("malformed let binding block")]
    MalformedLet { span: Span },
    #[error("if expects condition, consequent and alternate, got {found} parts")]
    MalformedIf { found: usize, span: Span },
}

impl ParseError {
    /// Where in the input the parser gave up; used by the diagnostic
    /// reports.
    pub fn span(&self) -> Span {
        match self {
            ParseError::UnsupportedOperator { span, .. }
            | ParseError::MissingOperator { span }
            | ParseError::ExpectedParenthesized { span }
            | ParseError::MalformedLet { span }
            | ParseError::MalformedIf { span, .. } => *span,
        }
    }
}

// Result type alias for convenience
type ParseResult<T> = Result<T, ParseError>;

/// Parses one complete expression, threading the single shared binding
/// store through every recursive step. `let` forms write into `env` as a
/// side effect of parsing, before evaluation ever runs.
pub fn parse_str(input: &str, env: &Rc<RefCell<Environment>>) -> ParseResult<Node> {
    parse_expr(input, 0, env)
}

fn parse_expr(text: &str, offset: usize, env: &Rc<RefCell<Environment>>) -> ParseResult<Node> {
    let span = Span::new(offset, offset + text.len());

    // A leaf iff the text contains no parentheses at all.
    if !text.contains(['(', ')']) {
        let leading = text.len() - text.trim_start().len();
        let trimmed = text.trim();
        let start = offset + leading;
        return Ok(Node::new(
            Expr::Atom(trimmed.to_string()),
            Span::new(start, start + trimmed.len()),
            env.clone(),
        ));
    }

    if text.len() < 2 || !text.starts_with('(') || !text.ends_with(')') {
        return Err(ParseError::ExpectedParenthesized { span });
    }

    // Strip the one enclosing pair, then split off the leading token as
    // the operator; the remainder is the operator's body text.
    let inner = &text[1..text.len() - 1];
    let inner_offset = offset + 1;
    let (symbol, body, body_offset) = match inner.find(' ') {
        Some(space) => (
            &inner[..space],
            &inner[space + 1..],
            inner_offset + space + 1,
        ),
        None => (inner, "", inner_offset + inner.len()),
    };
    if symbol.is_empty() {
        return Err(ParseError::MissingOperator { span });
    }
    let op = Op::from_symbol(symbol).ok_or_else(|| ParseError::UnsupportedOperator {
        op: symbol.to_string(),
        span: Span::new(inner_offset, inner_offset + symbol.len()),
    })?;

    let kind = match op {
        // The quoted body is kept verbatim, never re-parsed.
        Op::Quote => Expr::Quote(body.to_string()),
        Op::Let => Expr::Operation {
            op,
            args: vec![parse_let(body, body_offset, env)?],
        },
        Op::If => {
            let chunks = split_depth_zero(body, body_offset);
            if chunks.len() != 3 {
                return Err(ParseError::MalformedIf {
                    found: chunks.len(),
                    span,
                });
            }
            Expr::Operation {
                op,
                args: parse_chunks(&chunks, env)?,
            }
        }
        _ => {
            let chunks = split_depth_zero(body, body_offset);
            Expr::Operation {
                op,
                args: parse_chunks(&chunks, env)?,
            }
        }
    };

    Ok(Node::new(kind, span, env.clone()))
}

/// Splits on spaces only where the parenthesis nesting depth is zero, so
/// sub-expressions are never cut apart. Always yields at least one chunk;
/// consecutive spaces yield empty chunks, which parse as empty atoms.
fn split_depth_zero(body: &str, offset: usize) -> Vec<(usize, &str)> {
    let mut chunks = Vec::new();
    let mut depth = 0i32;
    let mut last_split = 0;
    for (i, ch) in body.char_indices() {
        match ch {
            ' ' if depth == 0 => {
                chunks.push((offset + last_split, &body[last_split..i]));
                last_split = i + 1;
            }
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
    }
    chunks.push((offset + last_split, &body[last_split..]));
    chunks
}

fn parse_chunks(chunks: &[(usize, &str)], env: &Rc<RefCell<Environment>>) -> ParseResult<Vec<Node>> {
    chunks
        .iter()
        .map(|(offset, chunk)| parse_expr(chunk, *offset, env))
        .collect()
}

/// `let` is the one operator that mutates state while parsing: each
/// `(name value)` pair of the binding block is written into the shared
/// store as raw, unevaluated text, and only the trailing body becomes a
/// child node.
fn parse_let(body: &str, offset: usize, env: &Rc<RefCell<Environment>>) -> ParseResult<Node> {
    let span = Span::new(offset, offset + body.len());
    let malformed = || ParseError::MalformedLet { span };

    // Find where the binding block closes at depth zero.
    let mut close = None;
    let mut depth = 0i32;
    for (i, ch) in body.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
        if depth == 0 {
            close = Some(i);
            break;
        }
    }
    let close = close.ok_or_else(malformed)?;

    // The block must look like `((name value) ...)` and leave room for a
    // result expression after it.
    if close < 3
        || close + 2 > body.len()
        || !body.is_char_boundary(2)
        || !body.is_char_boundary(close - 1)
        || !body.is_char_boundary(close + 2)
    {
        return Err(malformed());
    }

    for pair in body[2..close - 1].split(") (") {
        let mut tokens = pair.split_whitespace();
        match (tokens.next(), tokens.next()) {
            (Some(name), Some(value)) => env.borrow_mut().bind(name, value),
            _ => return Err(malformed()),
        }
    }

    parse_expr(&body[close + 2..], offset + close + 2, env)
}
