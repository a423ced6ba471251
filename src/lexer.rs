use logos::Logos;
use std::fmt;

use crate::Span;

/// Token shapes of the surface syntax. Anything that is not a parenthesis
/// or whitespace lexes as an `Atom`, so scanning is total and cannot fail.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")] // Skip whitespace
pub enum TokenKind {
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[regex(r"[^() \t\n\r]+", |lex| lex.slice().to_string())]
    Atom(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::Atom(s) => write!(f, "{}", s),
        }
    }
}

// Helper function to tokenize a string directly (used by the validator,
// the REPL completer and tests)
pub fn tokenize(input: &str) -> Vec<Token> {
    TokenKind::lexer(input)
        .spanned()
        .filter_map(|(result, range)| {
            // The rules above cover every non-skipped character, so the
            // error branch never fires.
            result.ok().map(|kind| Token {
                kind,
                span: Span {
                    start: range.start,
                    end: range.end,
                },
            })
        })
        .collect()
}
