//! Predict command implementation

use std::collections::BTreeMap;

use crate::cli::logging::log;
use crate::cli::{LogLevel, OutputFormat, PredictArgs};
use crate::config::PipelineConfig;
use crate::pipeline::PipelineOrchestrator;

pub fn run_predict(
    args: &PredictArgs,
    config: PipelineConfig,
    level: LogLevel,
) -> Result<(), String> {
    let content = std::fs::read_to_string(&args.input)
        .map_err(|e| format!("Failed to read {}: {e}", args.input.display()))?;
    let features: BTreeMap<String, f64> =
        serde_json::from_str(&content).map_err(|e| format!("Invalid input row: {e}"))?;

    let pipeline = PipelineOrchestrator::open(config).map_err(|e| e.to_string())?;
    let prediction = pipeline.predict(&features).map_err(|e| e.to_string())?;

    match args.format {
        OutputFormat::Text => {
            log(
                level,
                LogLevel::Normal,
                &format!(
                    "Class {} (confidence {:.4}) from {}",
                    prediction.class, prediction.confidence, prediction.version_id
                ),
            );
            let probabilities = format!("  probabilities: {:?}", prediction.probabilities);
            log(level, LogLevel::Verbose, &probabilities);
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&prediction)
                .map_err(|e| format!("JSON serialization error: {e}"))?;
            println!("{json}");
        }
    }
    Ok(())
}
