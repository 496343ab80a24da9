//! # mbutane CLI
//!
//! This is the binary entry point for the `mbutane` command-line tool.
//!
//! Its responsibilities are parsing arguments with `clap`, installing the
//! Ctrl-C handler and translating errors into messages and exit codes. The
//! composition itself lives in the `mbutane` library crate.

mod cli;
mod commands;

use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;

use mbutane::exit_codes;

fn main() -> ExitCode {
    if let Err(e) = ctrlc::set_handler(|| {
        eprintln!("Interrupted");
        std::process::exit(i32::from(exit_codes::INTERRUPTED));
    }) {
        eprintln!("Warning: failed to install Ctrl-C handler: {}", e);
    }

    let cli = match cli::Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    ExitCode::from(exit_codes::SUCCESS)
                }
                _ => ExitCode::from(exit_codes::ERROR),
            };
        }
    };

    match cli.execute() {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}
