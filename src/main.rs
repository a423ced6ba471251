use std::env;
use std::process::ExitCode;

// Example: lisplet "(let ((a 2) (b 10)) (+ a b))"
fn main() -> ExitCode {
    let mut args = env::args().skip(1);
    let (Some(raw), None) = (args.next(), args.next()) else {
        eprintln!("usage: lisplet \"<expression>\"");
        return ExitCode::FAILURE;
    };

    let input = raw.trim().to_string();
    match lisplet::run(&input) {
        Ok(value) => {
            println!("{}", value);
            ExitCode::SUCCESS
        }
        Err(error) => {
            error.pretty_print(&input);
            ExitCode::FAILURE
        }
    }
}
