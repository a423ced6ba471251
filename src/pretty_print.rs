use crate::{Error, EvalError, ParseError, Span, SyntaxError};
use ariadne::{Label, Report, ReportKind, Source};

// Source id shown in the report header. The whole program is one
// expression, so there is only ever one source.
const SOURCE_ID: &str = "input";

fn print_report(input: &str, span: Span, message: String, label: String) {
    Report::build(ReportKind::Error, (SOURCE_ID, span.to_range()))
        .with_message(message)
        .with_label(Label::new((SOURCE_ID, span.to_range())).with_message(label))
        .finish()
        .print((SOURCE_ID, Source::from(input)))
        .unwrap();
}

impl SyntaxError {
    pub fn pretty_print(&self, input: &str) {
        match self {
            SyntaxError::UnbalancedParens { open, close } => print_report(
                input,
                Span::new(0, input.len()),
                "Malformed input".to_string(),
                format!("{} opening vs {} closing parentheses", open, close),
            ),
            SyntaxError::MissingEnclosingParens { span } => print_report(
                input,
                *span,
                "Missing enclosing parentheses".to_string(),
                "These look like sibling expressions without their own parentheses".to_string(),
            ),
        }
    }
}

impl ParseError {
    pub fn pretty_print(&self, input: &str) {
        let label = match self {
            ParseError::UnsupportedOperator { .. } => "This operator has no evaluation rule",
            ParseError::MissingOperator { .. } => {
                "An operation needs an operator right after its opening parenthesis"
            }
            ParseError::ExpectedParenthesized { .. } => {
                "This text mixes parentheses with surrounding characters"
            }
            ParseError::MalformedLet { .. } => {
                "Expected `((name value) ...)` followed by a result expression"
            }
            ParseError::MalformedIf { .. } => "Expected `(if condition consequent alternate)`",
        };
        print_report(
            input,
            self.span(),
            format!("Parse error: {}", self),
            label.to_string(),
        );
    }
}

impl EvalError {
    pub fn pretty_print(&self, input: &str) {
        let label = match self {
            EvalError::ArityViolation { .. } => "Wrong number of arguments for this operator",
            EvalError::DivisionByZero { .. } => "This divisor evaluates to zero",
            EvalError::TypeMismatch { .. } => "This operand has the wrong type",
        };
        print_report(
            input,
            self.span(),
            format!("Evaluation error: {}", self),
            label.to_string(),
        );
    }
}

impl Error {
    pub fn pretty_print(&self, input: &str) {
        match self {
            Error::Syntax(error) => error.pretty_print(input),
            Error::Parse(error) => error.pretty_print(input),
            Error::Eval(error) => error.pretty_print(input),
        }
    }
}
