//! Demo command implementation
//!
//! Trains on a synthetic blob dataset and feeds a shifted batch through the
//! pipeline, all against an in-memory store.

use std::sync::Arc;

use crate::cli::logging::log;
use crate::cli::{DemoArgs, LogLevel};
use crate::clock::SystemClock;
use crate::config::PipelineConfig;
use crate::data::synthetic::SyntheticClassification;
use crate::pipeline::PipelineOrchestrator;

use super::run::{execute, print_report};

/// Feature level of the synthetic data. Drift scores are relative to the
/// baseline mean, so the data sits away from zero.
const BASE_LEVEL: f64 = 10.0;

pub fn run_demo(args: &DemoArgs, config: PipelineConfig, level: LogLevel) -> Result<(), String> {
    if args.samples < 10 {
        return Err(format!("--samples must be at least 10, got {}", args.samples));
    }
    let train = SyntheticClassification::new(args.features)
        .samples(args.samples)
        .shift(BASE_LEVEL)
        .seed(args.seed)
        .generate();
    let fresh = SyntheticClassification::new(args.features)
        .samples((args.samples / 5).max(10))
        .shift(BASE_LEVEL + args.drift)
        .label_noise(args.label_noise)
        .seed(args.seed.wrapping_add(1))
        .generate();

    log(
        level,
        LogLevel::Verbose,
        &format!(
            "Synthetic data: {} training rows, {} new rows, drift offset {}",
            train.len(),
            fresh.len(),
            args.drift
        ),
    );

    let mut pipeline = PipelineOrchestrator::in_memory(config, Arc::new(SystemClock));
    pipeline.on_drift(move |report| {
        let message = format!("! drift detected (max score {:.4})", report.max_drift_score);
        log(level, LogLevel::Normal, &message);
    });
    pipeline.on_alert(move |alert| {
        log(level, LogLevel::Normal, &format!("! alert: {}", alert.kind.message()));
    });

    let report = execute(&pipeline, &train, Some(&fresh))?;
    print_report(&report, args.format, level)
}
