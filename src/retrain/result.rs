//! Retrain results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::{Metadata, Metrics};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrainStatus {
    Completed,
    Failed,
}

/// Outcome of one retrain attempt, successful or not.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RetrainResult {
    /// Saved (staged) version; `None` when training failed
    pub version_id: Option<String>,
    pub metrics: Metrics,
    pub metadata: Metadata,
    pub status: RetrainStatus,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl RetrainResult {
    pub fn is_completed(&self) -> bool {
        self.status == RetrainStatus::Completed
    }

    /// Held-out accuracy of the candidate.
    pub fn accuracy(&self) -> Option<f64> {
        self.metrics.get("accuracy").copied()
    }

    pub(crate) fn failed(error: String, metadata: Metadata, timestamp: DateTime<Utc>) -> Self {
        Self {
            version_id: None,
            metrics: Metrics::new(),
            metadata,
            status: RetrainStatus::Failed,
            error: Some(error),
            timestamp,
        }
    }
}
