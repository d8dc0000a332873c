//! # kwd CLI
//!
//! Command-line interface for layer keyword metadata.
//!
//! This binary provides human-friendly access to `kwd-core` functionality.
//! Run `kwd --help` for usage information.

mod cli;
pub mod ui;

use std::process::ExitCode;

fn main() -> ExitCode {
    cli::run()
}
