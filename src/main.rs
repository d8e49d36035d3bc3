//! Continual CLI
//!
//! Command-line entry point for the continuous learning pipeline.
//!
//! # Usage
//!
//! ```bash
//! # Train, then check a new batch for drift and degradation
//! continual run train.json --new-data fresh.json
//!
//! # Full lifecycle on synthetic data
//! continual demo --drift 2.0
//!
//! # Inspect and manage versions
//! continual versions
//! continual promote v_20240101_000000_0badc0de
//! continual rollback --steps 1
//!
//! # Validate config
//! continual validate pipeline.yaml
//! ```

use clap::Parser;
use continual::cli::{run_command, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
