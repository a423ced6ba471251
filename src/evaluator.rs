use thiserror::Error;

use crate::Span;
use crate::types::{Expr, Node, Op, Value};

// --- Evaluation Error ---
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("'{op}' expects {expected} argument(s), got {found}")]
    ArityViolation {
        op: Op,
        expected: usize,
        found: usize,
        span: Span,
    },
    #[error("division by zero")]
    DivisionByZero { span: Span },
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
        span: Span,
    },
}

impl EvalError {
    pub fn span(&self) -> Span {
        match self {
            EvalError::ArityViolation { span, .. }
            | EvalError::DivisionByZero { span }
            | EvalError::TypeMismatch { span, .. } => *span,
        }
    }
}

// Result type alias for convenience
pub type EvalResult<T = Value> = Result<T, EvalError>;

/// Computes the scalar value of a parsed expression tree. The binding
/// store consulted for atoms is the one each node captured at parse time.
pub fn evaluate(node: &Node) -> EvalResult {
    match &node.kind {
        Expr::Atom(text) => {
            // One level of lookup, then numeral conversion; an unbound
            // symbol is not an error, its own text is the numeral.
            let resolved = node.env.borrow().lookup(text);
            let number = match resolved {
                Some(raw) => integer_prefix(&raw),
                None => integer_prefix(text),
            };
            Ok(Value::Integer(number))
        }
        Expr::Quote(text) => Ok(Value::Text(text.clone())),
        Expr::Operation { op, args } => evaluate_operation(*op, args, node.span),
    }
}

fn evaluate_operation(op: Op, args: &[Node], span: Span) -> EvalResult {
    match op {
        Op::Add => fold_integers(args, 0, i64::wrapping_add),
        Op::Mul => fold_integers(args, 1, i64::wrapping_mul),
        Op::Sub => {
            let (first, rest) = seed(op, args, span)?;
            let mut result = expect_integer(first)?;
            for node in rest {
                result = result.wrapping_sub(expect_integer(node)?);
            }
            Ok(Value::Integer(result))
        }
        Op::Div => {
            let (first, rest) = seed(op, args, span)?;
            let mut result = expect_integer(first)?;
            for node in rest {
                let divisor = expect_integer(node)?;
                if divisor == 0 {
                    return Err(EvalError::DivisionByZero { span: node.span });
                }
                result = result.wrapping_div(divisor);
            }
            Ok(Value::Integer(result))
        }
        Op::Mod => {
            let [lhs, rhs] = args else {
                return Err(EvalError::ArityViolation {
                    op,
                    expected: 2,
                    found: args.len(),
                    span,
                });
            };
            let left = expect_integer(lhs)?;
            let right = expect_integer(rhs)?;
            if right == 0 {
                return Err(EvalError::DivisionByZero { span: rhs.span });
            }
            Ok(Value::Integer(left.wrapping_rem(right)))
        }
        Op::Less => compare_integers(op, args, span, |left, right| left < right),
        Op::Greater => compare_integers(op, args, span, |left, right| left > right),
        Op::Equal => compare_integers(op, args, span, |left, right| left == right),
        Op::Let => {
            // The bound names were installed at parse time; only the body
            // is left to evaluate.
            let [body] = args else {
                return Err(EvalError::ArityViolation {
                    op,
                    expected: 1,
                    found: args.len(),
                    span,
                });
            };
            evaluate(body)
        }
        Op::If => {
            let [condition, consequent, alternate] = args else {
                return Err(EvalError::ArityViolation {
                    op,
                    expected: 3,
                    found: args.len(),
                    span,
                });
            };
            let condition = evaluate(condition)?;
            // Both branches are evaluated eagerly; only the selected
            // value is returned.
            let consequent = evaluate(consequent)?;
            let alternate = evaluate(alternate)?;
            Ok(if is_truthy(&condition) {
                consequent
            } else {
                alternate
            })
        }
        // The parser stores quote forms as `Expr::Quote`.
        Op::Quote => unreachable!("quote carries a text payload, not child nodes"),
    }
}

fn fold_integers<F: Fn(i64, i64) -> i64>(args: &[Node], start: i64, func: F) -> EvalResult {
    let mut acc = start;
    for node in args {
        acc = func(acc, expect_integer(node)?);
    }
    Ok(Value::Integer(acc))
}

fn compare_integers<F: Fn(i64, i64) -> bool>(
    op: Op,
    args: &[Node],
    span: Span,
    compare: F,
) -> EvalResult {
    let [lhs, rhs] = args else {
        return Err(EvalError::ArityViolation {
            op,
            expected: 2,
            found: args.len(),
            span,
        });
    };
    Ok(Value::Boolean(compare(
        expect_integer(lhs)?,
        expect_integer(rhs)?,
    )))
}

// Left-folds seed themselves from the first child. The parser always
// yields at least one chunk, so the error arm is a guard, not a path.
fn seed<'a>(op: Op, args: &'a [Node], span: Span) -> EvalResult<(&'a Node, &'a [Node])> {
    args.split_first().ok_or(EvalError::ArityViolation {
        op,
        expected: 1,
        found: 0,
        span,
    })
}

fn expect_integer(node: &Node) -> EvalResult<i64> {
    match evaluate(node)? {
        Value::Integer(n) => Ok(n),
        other => Err(EvalError::TypeMismatch {
            expected: "integer",
            found: other.type_name(),
            span: node.span,
        }),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Boolean(b) => *b,
        Value::Integer(n) => *n != 0,
        Value::Text(_) => true,
    }
}

/// Leading-integer conversion with a zero default: optional sign followed
/// by as many digits as there are, ignoring the rest of the text. `"12ab"`
/// is 12, `"abc"` is 0.
fn integer_prefix(text: &str) -> i64 {
    let trimmed = text.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().map_or(0, |n| sign * n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;
    use crate::parser::parse_str;

    fn eval_str(input: &str) -> EvalResult {
        let env = Environment::new();
        let node = parse_str(input, &env)
            .unwrap_or_else(|e| panic!("Parsing failed for input '{}': {}", input, e));
        evaluate(&node)
    }

    // Helper to evaluate input and check the resulting value
    fn assert_eval(input: &str, expected: Value) {
        match eval_str(input) {
            Ok(value) => assert_eq!(value, expected, "Input: '{}'", input),
            Err(e) => panic!("Evaluation failed for input '{}': {}", input, e),
        }
    }

    // Helper to assert evaluation errors by variant
    fn assert_eval_error(input: &str, expected: &EvalError) {
        match eval_str(input) {
            Ok(value) => panic!(
                "Expected evaluation to fail for input '{}', but got: {}",
                input, value
            ),
            Err(e) => assert_eq!(
                std::mem::discriminant(&e),
                std::mem::discriminant(expected),
                "Input: '{}', Expected error variant like {:?}, got: {:?}",
                input,
                expected,
                e
            ),
        }
    }

    #[test]
    fn test_eval_arithmetic() {
        assert_eval("(+ 2 3)", Value::Integer(5));
        assert_eval("(+ 10 20 30 40)", Value::Integer(100));
        assert_eval("(* 5 6)", Value::Integer(30));
        assert_eval("(* 2 3 4)", Value::Integer(24));
        assert_eval("(- 10 3 2)", Value::Integer(5));
        assert_eval("(/ 20 2 2)", Value::Integer(5));
        assert_eval("(/ 7 2)", Value::Integer(3)); // host truncating division
    }

    #[test]
    fn test_eval_left_folds_seed_from_first_child() {
        // A single operand is returned as-is, not negated or inverted.
        assert_eval("(- 5)", Value::Integer(5));
        assert_eval("(/ 5)", Value::Integer(5));
    }

    #[test]
    fn test_eval_modulo() {
        assert_eval("(% 10 3)", Value::Integer(1));
        assert_eval("(% 9 3)", Value::Integer(0));

        let arity = EvalError::ArityViolation {
            op: Op::Mod,
            expected: 2,
            found: 0,
            span: Span::default(),
        };
        assert_eval_error("(% 10 3 1)", &arity);
        assert_eval_error("(% 10)", &arity);
    }

    #[test]
    fn test_eval_division_by_zero() {
        let division = EvalError::DivisionByZero {
            span: Span::default(),
        };
        assert_eval_error("(/ 5 0)", &division);
        assert_eval_error("(% 5 0)", &division);
        assert_eval_error("(/ 20 2 0)", &division);
    }

    #[test]
    fn test_eval_comparisons() {
        assert_eval("(> 2 3)", Value::Boolean(false));
        assert_eval("(< 2 3)", Value::Boolean(true));
        assert_eval("(= 3 3)", Value::Boolean(true));
        assert_eval("(= 3 4)", Value::Boolean(false));

        let arity = EvalError::ArityViolation {
            op: Op::Less,
            expected: 2,
            found: 0,
            span: Span::default(),
        };
        assert_eval_error("(< 1 2 3)", &arity);
        assert_eval_error("(> 1)", &arity);
    }

    #[test]
    fn test_eval_atoms() {
        assert_eval("7", Value::Integer(7));
        assert_eval("-7", Value::Integer(-7));
        // An unbound, non-numeric atom falls back to zero, never raises.
        assert_eval("frobnicate", Value::Integer(0));
        // Leading-integer conversion keeps the numeric prefix.
        assert_eval("(+ 12abc 1)", Value::Integer(13));
    }

    #[test]
    fn test_eval_let() {
        assert_eval("(let ((a 2) (b 10)) (+ a b))", Value::Integer(12));
        assert_eval("(let ((a 2)) (* a a))", Value::Integer(4));
        // Non-numeric bound text converts to zero at lookup time.
        assert_eval("(let ((a xyz)) a)", Value::Integer(0));
    }

    #[test]
    fn test_eval_sibling_lets_overwrite() {
        // One store for the whole parse: the second binding of `a` wins
        // everywhere, including inside the first let's body.
        assert_eval("(+ (let ((a 1)) a) (let ((a 2)) a))", Value::Integer(4));
    }

    #[test]
    fn test_eval_nested_let_shadowing() {
        assert_eval("(let ((a 1)) (let ((a 2)) a))", Value::Integer(2));
    }

    #[test]
    fn test_eval_parse_time_bindings_leak_across_branches() {
        // `z` is bound while parsing the consequent, so the alternate
        // resolves it too.
        assert_eval("(if (> 1 2) (let ((z 7)) z) z)", Value::Integer(7));
    }

    #[test]
    fn test_eval_quote() {
        assert_eval("(quote hello)", Value::Text("hello".to_string()));
        assert_eval("(quote (a b c))", Value::Text("(a b c)".to_string()));
        assert_eval("(quote hello world)", Value::Text("hello world".to_string()));
    }

    #[test]
    fn test_eval_if() {
        assert_eval("(if (< 2 3) 1 2)", Value::Integer(1));
        assert_eval("(if (> 2 3) 1 2)", Value::Integer(2));
        assert_eval(
            "(if (> 2 3) (* 5 6) (let ((a 3) (c 5)) (quote (a b c))))",
            Value::Text("(a b c)".to_string()),
        );
    }

    #[test]
    fn test_eval_if_truthiness() {
        assert_eval("(if 5 1 2)", Value::Integer(1)); // nonzero integer
        assert_eval("(if 0 1 2)", Value::Integer(2));
        assert_eval("(if (quote x) 1 2)", Value::Integer(1)); // text is true
    }

    #[test]
    fn test_eval_if_evaluates_both_branches() {
        // No short-circuit: a fault in the unselected branch still fires.
        let division = EvalError::DivisionByZero {
            span: Span::default(),
        };
        assert_eval_error("(if (= 1 1) 2 (/ 3 0))", &division);
    }

    #[test]
    fn test_eval_type_mismatch() {
        let mismatch = EvalError::TypeMismatch {
            expected: "",
            found: "",
            span: Span::default(),
        };
        assert_eval_error("(+ (> 1 0) 1)", &mismatch);
        assert_eval_error("(* 2 (quote x))", &mismatch);
        assert_eval_error("(< (quote a) 1)", &mismatch);
    }

    #[test]
    fn test_eval_is_idempotent_with_fresh_environments() {
        let input = "(let ((a 2) (b 10)) (+ a b))";
        assert_eq!(eval_str(input), eval_str(input));
    }

    #[test]
    fn test_integer_prefix() {
        assert_eq!(integer_prefix("42"), 42);
        assert_eq!(integer_prefix("-3"), -3);
        assert_eq!(integer_prefix("+10"), 10);
        assert_eq!(integer_prefix("12abc"), 12);
        assert_eq!(integer_prefix("abc"), 0);
        assert_eq!(integer_prefix(""), 0);
        assert_eq!(integer_prefix("-"), 0);
        assert_eq!(integer_prefix("  8"), 8);
    }
}
