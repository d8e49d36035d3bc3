//! Pipeline configuration parsing and management.
//!
//! Supports YAML configuration files; every field has a default so an empty
//! file (or no file at all) yields a working pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Complete pipeline configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Artifact store settings
    pub store: StoreConfig,
    /// Drift detection settings
    pub drift: DriftConfig,
    /// Retrain policy and training settings
    pub retrain: RetrainConfig,
    /// Production monitoring settings
    pub monitor: MonitorConfig,
    /// Background scheduling
    pub schedule: ScheduleConfig,
    /// Log output
    pub logging: LoggingConfig,
}

impl PipelineConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::io(format!("reading config file: {}", path.display()), e))?;

        Self::from_yaml(&content, path)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(content: &str, path: &Path) -> Result<Self> {
        let config: Self = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| Error::config(path, e.to_string()))?
        };
        config
            .validate()
            .map_err(|message| Error::config(path, message))?;
        Ok(config)
    }

    /// Check value ranges. Returns the first problem found.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !(self.drift.threshold > 0.0) {
            return Err("drift.threshold must be > 0".into());
        }
        let r = &self.retrain;
        if !(r.test_fraction > 0.0 && r.test_fraction < 1.0) {
            return Err("retrain.test_fraction must be in (0, 1)".into());
        }
        if r.cv_folds < 2 {
            return Err("retrain.cv_folds must be >= 2".into());
        }
        if r.performance_drop_threshold < 0.0 {
            return Err("retrain.performance_drop_threshold must be >= 0".into());
        }
        if r.min_improvement < 0.0 {
            return Err("retrain.min_improvement must be >= 0".into());
        }
        let m = &self.monitor;
        if !(0.0..=1.0).contains(&m.accuracy_min) {
            return Err("monitor.accuracy_min must be in [0, 1]".into());
        }
        if m.summary_window == 0 {
            return Err("monitor.summary_window must be > 0".into());
        }
        if self.schedule.interval_hours == 0 {
            return Err("schedule.interval_hours must be > 0".into());
        }
        Ok(())
    }
}

/// Artifact store configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding `versions.json` and model artifacts
    pub model_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
        }
    }
}

/// Drift detection configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DriftConfig {
    /// Max drift score above which drift is reported
    pub threshold: f64,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self { threshold: 0.1 }
    }
}

/// Retrain policy and training configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetrainConfig {
    /// Relative accuracy loss that triggers a retrain
    pub performance_drop_threshold: f64,
    /// Days without retraining after which a retrain is due
    pub max_days_since_retrain: i64,
    /// Held-out fraction for candidate evaluation
    pub test_fraction: f64,
    /// Cross-validation folds
    pub cv_folds: usize,
    /// Seed for splits and model randomness
    pub seed: u64,
    /// Model family name
    pub model_type: String,
    /// Margin by which a candidate must beat the incumbent's accuracy
    pub min_improvement: f64,
}

impl Default for RetrainConfig {
    fn default() -> Self {
        Self {
            performance_drop_threshold: 0.05,
            max_days_since_retrain: 30,
            test_fraction: 0.2,
            cv_folds: 5,
            seed: 42,
            model_type: "random_forest".to_string(),
            min_improvement: 0.0,
        }
    }
}

/// Production monitoring configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MonitorConfig {
    /// Accuracy floor below which an alert is raised
    pub accuracy_min: f64,
    /// Latency ceiling in seconds
    pub latency_max: f64,
    /// Number of recent predictions aggregated by the summary
    pub summary_window: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            accuracy_min: 0.8,
            latency_max: 1.0,
            summary_window: 100,
        }
    }
}

/// Background scheduling configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Hours between scheduled evaluate-and-maybe-retrain runs
    pub interval_hours: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self { interval_hours: 24 }
    }
}

/// Log output configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_policy() {
        let config = PipelineConfig::default();
        assert_eq!(config.drift.threshold, 0.1);
        assert_eq!(config.retrain.performance_drop_threshold, 0.05);
        assert_eq!(config.retrain.max_days_since_retrain, 30);
        assert_eq!(config.retrain.cv_folds, 5);
        assert_eq!(config.monitor.accuracy_min, 0.8);
        assert_eq!(config.monitor.summary_window, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = "drift:\n  threshold: 0.25\nretrain:\n  model_type: logistic_regression\n";
        let config = PipelineConfig::from_yaml(yaml, Path::new("p.yaml")).unwrap();
        assert_eq!(config.drift.threshold, 0.25);
        assert_eq!(config.retrain.model_type, "logistic_regression");
        assert_eq!(config.retrain.cv_folds, 5);
        assert_eq!(config.store.model_dir, PathBuf::from("models"));
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = PipelineConfig::from_yaml("", Path::new("p.yaml")).unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_invalid_range_rejected() {
        let yaml = "retrain:\n  test_fraction: 1.5\n";
        let err = PipelineConfig::from_yaml(yaml, Path::new("bad.yaml")).unwrap_err();
        assert!(err.to_string().contains("test_fraction"));
    }

    #[test]
    fn test_malformed_yaml_rejected() {
        let err = PipelineConfig::from_yaml("drift: [", Path::new("bad.yaml")).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_from_file_missing() {
        let err = PipelineConfig::from_file("/nonexistent/pipeline.yaml").unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_from_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.yaml");
        let mut config = PipelineConfig::default();
        config.monitor.accuracy_min = 0.9;
        std::fs::write(&path, serde_yaml::to_string(&config).unwrap()).unwrap();

        let loaded = PipelineConfig::from_file(&path).unwrap();
        assert_eq!(loaded.monitor.accuracy_min, 0.9);
    }
}
