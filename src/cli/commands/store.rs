//! Version management commands: versions, status, promote, rollback

use crate::cli::logging::log;
use crate::cli::{LogLevel, OutputFormat, PromoteArgs, RollbackArgs, StatusArgs, VersionsArgs};
use crate::config::PipelineConfig;
use crate::store::{ModelArtifactStore, ModelVersion};

fn open_store(config: &PipelineConfig) -> Result<ModelArtifactStore, String> {
    ModelArtifactStore::open(&config.store.model_dir).map_err(|e| e.to_string())
}

/// One line per version: id, status, accuracy, creation time
pub fn format_version_row(version: &ModelVersion) -> String {
    format!(
        "{:<32} {:<10} {:>8} {}",
        version.version_id,
        format!("{:?}", version.status).to_lowercase(),
        version.metric("accuracy").map_or_else(|| "-".to_string(), |a| format!("{a:.4}")),
        version.created_at.format("%Y-%m-%d %H:%M:%S")
    )
}

pub fn run_versions(
    args: &VersionsArgs,
    config: &PipelineConfig,
    level: LogLevel,
) -> Result<(), String> {
    let store = open_store(config)?;
    match args.format {
        OutputFormat::Text => {
            let versions = store.versions();
            if versions.is_empty() {
                log(level, LogLevel::Normal, "No model versions stored");
                return Ok(());
            }
            let header = format!("{:<32} {:<10} {:>8} CREATED", "VERSION", "STATUS", "ACCURACY");
            log(level, LogLevel::Normal, &header);
            for version in &versions {
                log(level, LogLevel::Normal, &format_version_row(version));
            }
        }
        OutputFormat::Json => {
            println!("{}", store.versions_json().map_err(|e| e.to_string())?);
        }
    }
    Ok(())
}

pub fn run_status(
    args: &StatusArgs,
    config: &PipelineConfig,
    level: LogLevel,
) -> Result<(), String> {
    let store = open_store(config)?;
    let current = store.current_version();
    match args.format {
        OutputFormat::Text => {
            let dir = config.store.model_dir.display();
            log(level, LogLevel::Normal, &format!("Model directory: {dir}"));
            log(level, LogLevel::Normal, &format!("Total versions: {}", store.versions().len()));
            match &current {
                Some(version) => {
                    log(level, LogLevel::Normal, &format!("Production: {}", version.version_id));
                    for (name, value) in &version.metrics {
                        log(level, LogLevel::Verbose, &format!("  {name}: {value:.4}"));
                    }
                }
                None => log(level, LogLevel::Normal, "Production: none"),
            }
            for transition in store.transitions().iter().rev().take(5) {
                log(
                    level,
                    LogLevel::Verbose,
                    &format!(
                        "  {} {:?} -> {:?} ({})",
                        transition.version_id, transition.from, transition.to, transition.reason
                    ),
                );
            }
        }
        OutputFormat::Json => {
            let status = serde_json::json!({
                "model_dir": config.store.model_dir,
                "total_versions": store.versions().len(),
                "current_version": current,
                "transitions": store.transitions().len(),
            });
            let json = serde_json::to_string_pretty(&status)
                .map_err(|e| format!("JSON serialization error: {e}"))?;
            println!("{json}");
        }
    }
    Ok(())
}

pub fn run_promote(
    args: &PromoteArgs,
    config: &PipelineConfig,
    level: LogLevel,
) -> Result<(), String> {
    let store = open_store(config)?;
    if !store.promote(&args.version_id).map_err(|e| e.to_string())? {
        return Err(format!("Unknown version: {}", args.version_id));
    }
    log(level, LogLevel::Normal, &format!("Promoted {} to production", args.version_id));
    Ok(())
}

pub fn run_rollback(
    args: &RollbackArgs,
    config: &PipelineConfig,
    level: LogLevel,
) -> Result<(), String> {
    let store = open_store(config)?;
    if !store.rollback(args.steps).map_err(|e| e.to_string())? {
        return Err(format!(
            "Cannot roll back {} step(s): not enough production history",
            args.steps
        ));
    }
    log(
        level,
        LogLevel::Normal,
        &format!("Rolled back to {}", store.current_id().unwrap_or_default()),
    );
    Ok(())
}
