//! Drift report types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::stats::SkippedItem;

/// Fraction of the threshold at which a score is worth a warning.
const WARNING_MULTIPLIER: f64 = 0.8;

/// Severity levels for drift
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// No drift detected
    None,
    /// Close to the threshold; worth watching
    Warning,
    /// Over the threshold; retraining is warranted
    Critical,
}

/// Outcome of one drift check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftReport {
    pub drift_detected: bool,
    pub max_drift_score: f64,
    pub drift_scores: BTreeMap<String, f64>,
    pub timestamp: DateTime<Utc>,
    /// This check had no baseline and established one from its batch
    pub baseline_established: bool,
    pub skipped: Vec<SkippedItem>,
}

impl DriftReport {
    /// Grade the report against `threshold`.
    pub fn severity(&self, threshold: f64) -> Severity {
        if self.drift_detected || self.max_drift_score > threshold {
            Severity::Critical
        } else if self.max_drift_score >= threshold * WARNING_MULTIPLIER {
            Severity::Warning
        } else {
            Severity::None
        }
    }

    /// Columns whose score exceeds `threshold`, worst first.
    pub fn drifted_columns(&self, threshold: f64) -> Vec<(&str, f64)> {
        let mut drifted: Vec<(&str, f64)> = self
            .drift_scores
            .iter()
            .filter(|(_, s)| **s > threshold)
            .map(|(c, s)| (c.as_str(), *s))
            .collect();
        drifted.sort_by(|a, b| b.1.total_cmp(&a.1));
        drifted
    }
}

/// Callback type for drift events
pub type DriftCallback = Box<dyn Fn(&DriftReport) + Send + Sync>;
