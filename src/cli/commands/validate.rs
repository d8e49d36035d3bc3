//! Validate command implementation

use crate::cli::logging::log;
use crate::cli::{LogLevel, ValidateArgs};
use crate::config::PipelineConfig;
use crate::models::ModelFamily;

pub fn run_validate(args: &ValidateArgs, level: LogLevel) -> Result<(), String> {
    log(level, LogLevel::Normal, &format!("Validating config: {}", args.config.display()));

    let config = PipelineConfig::from_file(&args.config).map_err(|e| format!("Config error: {e}"))?;

    if ModelFamily::try_parse(&config.retrain.model_type).is_none() {
        log(
            level,
            LogLevel::Normal,
            &format!(
                "  warning: unknown model_type '{}', the default ensemble will be used",
                config.retrain.model_type
            ),
        );
    }

    log(level, LogLevel::Normal, "✓ Configuration is valid");
    if args.detailed {
        let yaml = serde_yaml::to_string(&config)
            .map_err(|e| format!("YAML serialization error: {e}"))?;
        log(level, LogLevel::Normal, &yaml);
    }
    Ok(())
}
