//! # create-openfort
//!
//! Binary entry point for the `create-openfort` scaffolding tool.
//!
//! Parses arguments with `clap`, runs the create command and turns errors
//! into a message and a non-zero exit status. A cancelled run prints its
//! message without an error prefix.

mod cli;
mod commands;

use std::process::ExitCode;

use clap::Parser;
use create_openfort::error::Error;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    match cli.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<Error>() {
                Some(err) if err.is_cancelled() => eprintln!("{}", err),
                _ => eprintln!("Error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}
