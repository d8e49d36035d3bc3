//! CLI argument parsing
//!
//! # Usage
//!
//! ```bash
//! continual run train.json --new-data fresh.json
//! continual demo --samples 2000 --drift 1.5
//! continual versions --format json
//! continual promote v_20240101_000000_0badc0de
//! continual rollback --steps 2
//! continual validate pipeline.yaml
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Continual: retrain, version and monitor classification models
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "continual")]
#[command(version)]
#[command(about = "Continuous learning pipeline: drift detection, retraining and model versioning")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Pipeline configuration file (YAML)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override the model directory from the configuration
    #[arg(long, global = true, value_name = "DIR")]
    pub model_dir: Option<PathBuf>,

    /// Emit JSON log lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Train on a dataset, then process a new batch if given
    Run(RunArgs),

    /// Run the full lifecycle on synthetic data
    Demo(DemoArgs),

    /// Predict one row with the production model
    Predict(PredictArgs),

    /// List stored model versions
    Versions(VersionsArgs),

    /// Show the production version and store totals
    Status(StatusArgs),

    /// Make a stored version the production model
    Promote(PromoteArgs),

    /// Restore an earlier production model
    Rollback(RollbackArgs),

    /// Train once, then run scheduled retrain checks
    Schedule(ScheduleArgs),

    /// Validate a configuration file
    Validate(ValidateArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct RunArgs {
    /// Initial training dataset (JSON)
    #[arg(value_name = "TRAIN")]
    pub train: PathBuf,

    /// New labeled batch to check for drift and performance (JSON)
    #[arg(short, long, value_name = "FILE")]
    pub new_data: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the demo command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct DemoArgs {
    /// Training samples
    #[arg(long, default_value = "1000")]
    pub samples: usize,

    /// Feature columns
    #[arg(long, default_value = "4")]
    pub features: usize,

    /// Offset added to every feature of the new batch
    #[arg(long, default_value = "1.5")]
    pub drift: f64,

    /// Fraction of new-batch labels flipped
    #[arg(long, default_value = "0.0")]
    pub label_noise: f64,

    /// Random seed
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the predict command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct PredictArgs {
    /// JSON object mapping feature name to value
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the versions command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct VersionsArgs {
    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the status command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct StatusArgs {
    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the promote command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct PromoteArgs {
    /// Version id to promote
    #[arg(value_name = "VERSION")]
    pub version_id: String,
}

/// Arguments for the rollback command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct RollbackArgs {
    /// How many promotions to undo
    #[arg(short, long, default_value = "1")]
    pub steps: usize,
}

/// Arguments for the schedule command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ScheduleArgs {
    /// Training dataset used for the initial model and scheduled retrains
    #[arg(value_name = "TRAIN")]
    pub train: PathBuf,

    /// Seconds between checks (overrides `schedule.interval_hours`)
    #[arg(long)]
    pub interval_secs: Option<u64>,

    /// Stop after this many checks
    #[arg(long)]
    pub max_runs: Option<usize>,
}

/// Arguments for the validate command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ValidateArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Print the resolved configuration
    #[arg(short, long)]
    pub detailed: bool,
}

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {s}. Valid formats: text, json")),
        }
    }
}

/// Parse arguments (for testing)
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_command() {
        let cli = parse_args(["continual", "run", "train.json", "--new-data", "new.json"]).unwrap();
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.train, PathBuf::from("train.json"));
                assert_eq!(args.new_data, Some(PathBuf::from("new.json")));
                assert_eq!(args.format, OutputFormat::Text);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = parse_args(["continual", "status", "--config", "p.yaml", "-q"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("p.yaml")));
        assert!(cli.quiet);
        assert!(matches!(cli.command, Command::Status(_)));
    }

    #[test]
    fn test_parse_rollback_default_steps() {
        let cli = parse_args(["continual", "rollback"]).unwrap();
        assert_eq!(cli.command, Command::Rollback(RollbackArgs { steps: 1 }));

        let cli = parse_args(["continual", "rollback", "--steps", "3"]).unwrap();
        assert_eq!(cli.command, Command::Rollback(RollbackArgs { steps: 3 }));
    }

    #[test]
    fn test_parse_promote_requires_version() {
        assert!(parse_args(["continual", "promote"]).is_err());
        let cli = parse_args(["continual", "promote", "v_1"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Promote(PromoteArgs {
                version_id: "v_1".into()
            })
        );
    }

    #[test]
    fn test_parse_demo_defaults() {
        let cli = parse_args(["continual", "demo", "--format", "json"]).unwrap();
        match cli.command {
            Command::Demo(args) => {
                assert_eq!(args.samples, 1000);
                assert_eq!(args.features, 4);
                assert_eq!(args.format, OutputFormat::Json);
            }
            _ => panic!("Expected Demo command"),
        }
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(parse_args(["continual", "versions", "--format", "xml"]).is_err());
    }
}
