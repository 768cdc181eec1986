//! # OCSF Schema Compiler CLI
//!
//! This is the binary entry point for the `ocsf-compile` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Initialising logging for the requested level.
//! - Executing the selected subcommand and reporting its errors.
//!
//! All compilation logic lives in the `ocsf_compile` library; the binary only
//! loads a repository from disk, runs a compilation and prints the result.

mod cli;
mod commands;
mod output;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
