//! Run command implementation

use crate::cli::logging::log;
use crate::cli::{LogLevel, OutputFormat, RunArgs};
use crate::config::PipelineConfig;
use crate::data::LabeledBatch;
use crate::pipeline::{BatchOutcome, LifecycleSummary, PipelineOrchestrator};
use crate::retrain::RetrainResult;

pub fn run_run(args: &RunArgs, config: PipelineConfig, level: LogLevel) -> Result<(), String> {
    let train = LabeledBatch::from_json_file(&args.train).map_err(|e| e.to_string())?;
    let new_data = args
        .new_data
        .as_ref()
        .map(LabeledBatch::from_json_file)
        .transpose()
        .map_err(|e| e.to_string())?;

    let pipeline = PipelineOrchestrator::open(config).map_err(|e| e.to_string())?;
    let report = execute(&pipeline, &train, new_data.as_ref())?;
    print_report(&report, args.format, level)
}

/// What one lifecycle run produced.
#[derive(Debug, serde::Serialize)]
pub(super) struct RunReport {
    pub initial: RetrainResult,
    pub batch: Option<BatchOutcome>,
    pub summary: LifecycleSummary,
}

pub(super) fn execute(
    pipeline: &PipelineOrchestrator,
    train: &LabeledBatch,
    new_data: Option<&LabeledBatch>,
) -> Result<RunReport, String> {
    let initial = pipeline.initialize(train).map_err(|e| e.to_string())?;
    let batch = new_data
        .map(|batch| pipeline.process_batch(batch))
        .transpose()
        .map_err(|e| e.to_string())?;
    Ok(RunReport {
        initial,
        batch,
        summary: pipeline.summary(),
    })
}

pub(super) fn format_initial(result: &RetrainResult) -> String {
    format!(
        "Initial model: {} (accuracy {})",
        result.version_id.as_deref().unwrap_or("-"),
        fmt_opt(result.accuracy())
    )
}

pub(super) fn format_batch(outcome: &BatchOutcome) -> String {
    let mut lines = vec![
        format!(
            "  Drift: {} (max score {:.4})",
            if outcome.drift.drift_detected { "detected" } else { "none" },
            outcome.drift.max_drift_score
        ),
        format!("  Accuracy on batch: {:.4}", outcome.metrics.accuracy),
        format!("  Performance drop: {:.4}", outcome.performance_drop),
        format!("  Retrain decision: {}", outcome.decision.reason()),
    ];
    if let Some(retrain) = &outcome.retrain {
        match &retrain.error {
            Some(error) => lines.push(format!("  Retrain failed: {error}")),
            None => lines.push(format!(
                "  Candidate {} accuracy {} ({})",
                retrain.version_id.as_deref().unwrap_or("-"),
                fmt_opt(retrain.accuracy()),
                if outcome.promoted { "promoted" } else { "rejected" }
            )),
        }
    }
    lines.join("\n")
}

pub(super) fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.4}"))
}

pub(super) fn print_report(
    report: &RunReport,
    format: OutputFormat,
    level: LogLevel,
) -> Result<(), String> {
    match format {
        OutputFormat::Text => {
            log(level, LogLevel::Normal, &format_initial(&report.initial));
            if let Some(batch) = &report.batch {
                log(level, LogLevel::Normal, "New batch:");
                log(level, LogLevel::Normal, &format_batch(batch));
            }
            log(
                level,
                LogLevel::Normal,
                &format!(
                    "Production version: {}",
                    report.summary.current_version.as_deref().unwrap_or("-")
                ),
            );
            for drift in &report.summary.drift_history {
                log(
                    level,
                    LogLevel::Verbose,
                    &format!("  drift @ {}: {:?}", drift.timestamp, drift.drift_scores),
                );
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report)
                .map_err(|e| format!("JSON serialization error: {e}"))?;
            println!("{json}");
        }
    }
    Ok(())
}
