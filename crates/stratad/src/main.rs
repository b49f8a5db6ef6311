use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    match stratad::run_node() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let _ = writeln!(io::stderr().lock(), "stratad: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}
