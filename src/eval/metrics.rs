//! Classification metrics recorded on model versions.

use serde::{Deserialize, Serialize};

use crate::store::Metrics;

/// Accuracy, plus binary precision/recall/F1 when the truth has exactly two
/// distinct labels (the larger label is the positive class).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recall: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub f1: Option<f64>,
}

impl ClassificationMetrics {
    pub fn accuracy_only(accuracy: f64) -> Self {
        Self {
            accuracy,
            precision: None,
            recall: None,
            f1: None,
        }
    }

    /// Error rate (1 − accuracy).
    pub fn error_rate(&self) -> f64 {
        1.0 - self.accuracy
    }

    /// Named map form, as stored on a model version.
    pub fn to_metrics(&self) -> Metrics {
        let mut metrics = Metrics::from([("accuracy".to_string(), self.accuracy)]);
        let optional = [
            ("precision", self.precision),
            ("recall", self.recall),
            ("f1", self.f1),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                metrics.insert(name.to_string(), value);
            }
        }
        metrics
    }
}
