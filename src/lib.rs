// Declare modules publicly so they are part of the library interface
pub mod environment;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod pretty_print;
pub mod source;
pub mod types;
pub mod validator;

pub use environment::Environment;
pub use evaluator::{EvalError, EvalResult, evaluate};
pub use lexer::{Token, TokenKind, tokenize};
pub use parser::{ParseError, parse_str};
pub use source::Span;
pub use types::{Expr, Node, Op, Value};
pub use validator::{SyntaxError, validate};

/// Any fault the pipeline can surface. Internal stages propagate their own
/// error types with `?`; this single channel is what callers see, and only
/// the outermost caller turns it into a terminating exit status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Runs one input through the whole pipeline: validate, parse with a
/// fresh binding store, evaluate. Every top-level call gets its own
/// Environment, so repeated runs of the same text cannot leak state into
/// each other.
pub fn run(input: &str) -> Result<Value, Error> {
    validate(input)?;
    let env = Environment::new();
    let node = parse_str(input, &env)?;
    Ok(evaluate(&node)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_pipeline() {
        assert_eq!(run("(+ 2 3)"), Ok(Value::Integer(5)));
        assert_eq!(run("(< 2 3)"), Ok(Value::Boolean(true)));
        assert_eq!(
            run("(if (> 2 3) (* 5 6) (let ((a 3) (c 5)) (quote (a b c))))"),
            Ok(Value::Text("(a b c)".to_string()))
        );
    }

    #[test]
    fn test_run_stops_at_validation() {
        // Unbalanced input fails before parsing or evaluation ever run.
        assert!(matches!(run("((+ 2 3)"), Err(Error::Syntax(_))));
        assert!(matches!(run("(+ 1 2) foo"), Err(Error::Syntax(_))));
    }

    #[test]
    fn test_run_error_channels() {
        assert!(matches!(run("(foo 1 2)"), Err(Error::Parse(_))));
        assert!(matches!(run("(/ 5 0)"), Err(Error::Eval(_))));
    }

    #[test]
    fn test_run_is_idempotent() {
        let input = "(let ((a 2) (b 10)) (+ a b))";
        assert_eq!(run(input), run(input));
        assert_eq!(run(input), Ok(Value::Integer(12)));
    }
}
