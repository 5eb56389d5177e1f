//! docdelta CLI binary entry point
//!
//! This is a thin wrapper that calls the library's `run_cli()` function.

use std::process::ExitCode;

use docdelta_cli::run_cli;

fn main() -> ExitCode {
    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("comparison failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
