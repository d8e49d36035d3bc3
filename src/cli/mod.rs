//! CLI module for the continual pipeline
//!
//! Argument types live in `args`; each subcommand has a handler in
//! `commands`.

mod args;
mod commands;
mod logging;

pub use args::{
    parse_args, Cli, Command, DemoArgs, OutputFormat, PredictArgs, PromoteArgs, RollbackArgs,
    RunArgs, ScheduleArgs, StatusArgs, ValidateArgs, VersionsArgs,
};
pub use commands::{load_config, run_command};
pub use logging::LogLevel;
