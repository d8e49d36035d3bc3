//! CLI command implementations

mod demo;
mod predict;
mod run;
mod schedule;
mod store;
mod validate;


use std::path::Path;

use crate::cli::{Cli, Command, LogLevel};
use crate::config::PipelineConfig;

/// Execute a CLI command based on the parsed arguments
pub fn run_command(cli: Cli) -> Result<(), String> {
    let level = LogLevel::from_flags(cli.quiet, cli.verbose);

    let command = match cli.command {
        Command::Validate(args) => return validate::run_validate(&args, level),
        command => command,
    };

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(dir) = cli.model_dir {
        config.store.model_dir = dir;
    }
    if cli.log_json {
        config.logging.json = true;
    }
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    crate::logging::init(&config.logging);

    match command {
        Command::Run(args) => run::run_run(&args, config, level),
        Command::Demo(args) => demo::run_demo(&args, config, level),
        Command::Predict(args) => predict::run_predict(&args, config, level),
        Command::Versions(args) => store::run_versions(&args, &config, level),
        Command::Status(args) => store::run_status(&args, &config, level),
        Command::Promote(args) => store::run_promote(&args, &config, level),
        Command::Rollback(args) => store::run_rollback(&args, &config, level),
        Command::Schedule(args) => schedule::run_schedule(&args, config, level),
        Command::Validate(args) => validate::run_validate(&args, level),
    }
}

/// Load the configuration file, or defaults when none is given
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig, String> {
    match path {
        Some(path) => PipelineConfig::from_file(path).map_err(|e| format!("Config error: {e}")),
        None => Ok(PipelineConfig::default()),
    }
}
