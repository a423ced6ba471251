use rustyline::error::ReadlineError;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Cmd, Completer, Context, Editor, EventHandler, KeyCode, KeyEvent, Modifiers};
use rustyline::{Helper, Highlighter, Hinter, Validator};

use lisplet::{Op, TokenKind, tokenize};

struct OperatorCompleter;

impl rustyline::completion::Completer for OperatorCompleter {
    type Candidate = String;
    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        // Complete the multi-character operators (let, if, quote) from the
        // token under the cursor.
        let candidates = match tokenize(&line[..pos]).last().map(|t| t.kind.clone()) {
            Some(TokenKind::Atom(prefix)) => Op::SYMBOLS
                .iter()
                .filter_map(|symbol| {
                    symbol
                        .strip_prefix(prefix.as_str())
                        .filter(|rest| !rest.is_empty())
                        .map(|rest| rest.to_string())
                })
                .collect(),
            _ => vec![],
        };
        Ok((pos, candidates))
    }
}

#[derive(Completer, Helper, Highlighter, Hinter, Validator)]
struct InputHelper {
    #[rustyline(Validator)]
    validator: BalanceValidator,
    #[rustyline(Completer)]
    completer: OperatorCompleter,
}

/// Keeps the prompt open until the parentheses balance, so a form can be
/// typed across several lines.
struct BalanceValidator;

impl Validator for BalanceValidator {
    fn validate(&self, ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        let mut depth: i32 = 0;
        for (i, c) in ctx.input().chars().enumerate() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth < 0 {
                        return Ok(ValidationResult::Invalid(Some(format!(
                            "  - Unmatched ')' at position {}",
                            i
                        ))));
                    }
                }
                _ => {}
            }
        }

        if depth > 0 {
            Ok(ValidationResult::Incomplete)
        } else {
            Ok(ValidationResult::Valid(None))
        }
    }
}

fn main() -> rustyline::Result<()> {
    println!("lisplet REPL v0.1.0");
    println!("Type 'exit' or press Ctrl-D to quit.");

    let helper = InputHelper {
        validator: BalanceValidator,
        completer: OperatorCompleter,
    };
    let config = rustyline::config::Config::builder()
        .edit_mode(rustyline::EditMode::Vi)
        .build();
    let mut rl = Editor::with_config(config)?;
    rl.set_helper(Some(helper));
    rl.bind_sequence(
        KeyEvent(KeyCode::Char('s'), Modifiers::CTRL),
        EventHandler::Simple(Cmd::Newline),
    );
    if rl.load_history("lisplet_history.txt").is_err() {
        println!("No previous history.");
    }

    loop {
        let readline = rl.readline("lisplet> ");
        match readline {
            Ok(line) => {
                rl.add_history_entry(line.as_str())?;
                let trimmed_input = line.trim();
                if trimmed_input.is_empty() {
                    continue;
                }
                if trimmed_input.eq_ignore_ascii_case("exit") {
                    break;
                }

                // Each line is a complete top-level expression with its
                // own binding store.
                match lisplet::run(trimmed_input) {
                    Ok(value) => println!("{}", value),
                    Err(error) => error.pretty_print(trimmed_input),
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C
                println!("Interrupted. Type 'exit' or Ctrl-D to quit.");
            }
            Err(ReadlineError::Eof) => {
                // Ctrl-D
                println!("\nExiting.");
                break;
            }
            Err(err) => {
                eprintln!("Readline Error: {:?}", err);
                break;
            }
        }
    }
    rl.save_history("lisplet_history.txt")
}
