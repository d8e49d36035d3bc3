//! Schedule command implementation

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::cli::logging::log;
use crate::cli::{LogLevel, ScheduleArgs};
use crate::config::PipelineConfig;
use crate::data::LabeledBatch;
use crate::pipeline::PipelineOrchestrator;
use crate::scheduler::schedule_pipeline;

pub fn run_schedule(
    args: &ScheduleArgs,
    config: PipelineConfig,
    level: LogLevel,
) -> Result<(), String> {
    let interval = Duration::from_secs(
        args.interval_secs.unwrap_or(config.schedule.interval_hours.saturating_mul(3600)).max(1),
    );
    let train = LabeledBatch::from_json_file(&args.train).map_err(|e| e.to_string())?;

    let pipeline = PipelineOrchestrator::open(config).map_err(|e| e.to_string())?;
    let initial = pipeline.initialize(&train).map_err(|e| e.to_string())?;
    log(
        level,
        LogLevel::Normal,
        &format!(
            "Initial model {}; checking every {}s",
            initial.version_id.as_deref().unwrap_or("-"),
            interval.as_secs()
        ),
    );

    let scheduler = schedule_pipeline(Arc::new(pipeline), interval);
    loop {
        thread::sleep(interval.min(Duration::from_secs(1)));
        if args.max_runs.is_some_and(|max| scheduler.runs() >= max) {
            break;
        }
    }
    log(level, LogLevel::Normal, &format!("Completed {} scheduled check(s)", scheduler.runs()));
    scheduler.stop();
    Ok(())
}
