//! Orchestrator reports.

use serde::{Deserialize, Serialize};

use crate::drift::DriftReport;
use crate::eval::ClassificationMetrics;
use crate::monitor::MonitoringSummary;
use crate::retrain::{RetrainDecision, RetrainResult};

/// Where the pipeline stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelinePhase {
    /// No model has been trained by this pipeline
    Uninitialized,
    /// A lifecycle step is executing
    Running,
    /// The last lifecycle step finished
    Completed,
}

/// Everything `process_batch` observed and did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub drift: DriftReport,
    /// Production model on the new batch
    pub metrics: ClassificationMetrics,
    /// `(last_known_good − accuracy) / last_known_good`
    pub performance_drop: f64,
    pub decision: RetrainDecision,
    pub retrain: Option<RetrainResult>,
    pub promoted: bool,
    pub current_version: Option<String>,
}

/// End-of-run report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleSummary {
    pub pipeline_status: PipelinePhase,
    /// Version trained by `initialize`
    pub baseline_version: Option<String>,
    pub current_version: Option<String>,
    pub monitoring_summary: MonitoringSummary,
    /// Last five drift reports
    pub drift_history: Vec<DriftReport>,
}

/// Point-in-time status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineStatus {
    pub is_running: bool,
    pub current_version: Option<String>,
    pub total_versions: usize,
    pub monitoring: MonitoringSummary,
}

/// A served prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub class: usize,
    pub probabilities: Vec<f64>,
    /// Largest class probability
    pub confidence: f64,
    pub version_id: String,
    /// Seconds
    pub latency: f64,
}
