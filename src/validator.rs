use thiserror::Error;

use crate::Span;
use crate::lexer::{TokenKind, tokenize};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("malformed input: {open} opening vs {close} closing parentheses")]
    UnbalancedParens { open: usize, close: usize },
    #[error("sibling expressions are missing their enclosing parentheses")]
    MissingEnclosingParens { span: Span },
}

/// Checks gross well-formedness of the raw input before any parsing
/// begins. Purely a predicate over the text; the parser assumes it ran.
///
/// Two checks, both heuristic rather than exhaustive:
/// - opening and closing parenthesis counts must match;
/// - a `)` followed by one space and an operator-or-identifier character
///   signals two sibling expressions without their own enclosing pair.
pub fn validate(input: &str) -> Result<(), SyntaxError> {
    let tokens = tokenize(input);

    let open = count(&tokens, &TokenKind::LParen);
    let close = count(&tokens, &TokenKind::RParen);
    if open != close {
        return Err(SyntaxError::UnbalancedParens { open, close });
    }

    for pair in tokens.windows(2) {
        if let [left, right] = pair
            && left.kind == TokenKind::RParen
            && let TokenKind::Atom(text) = &right.kind
            && right.span.start == left.span.end + 1
            && input.as_bytes().get(left.span.end) == Some(&b' ')
            && text.starts_with(sibling_head_char)
        {
            return Err(SyntaxError::MissingEnclosingParens {
                span: left.span.merge(right.span),
            });
        }
    }

    Ok(())
}

fn count(tokens: &[crate::lexer::Token], kind: &TokenKind) -> usize {
    tokens.iter().filter(|token| token.kind == *kind).count()
}

// Digits stay out of this set: `(+ 1 2) 3` is for the parser to choke on,
// not the validator.
fn sibling_head_char(c: char) -> bool {
    c.is_ascii_alphabetic() || matches!(c, '*' | '-' | '+' | '/' | '<' | '>' | '=')
}
