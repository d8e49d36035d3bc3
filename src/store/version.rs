//! Model version records and their lifecycle status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Named evaluation metrics (`accuracy`, `f1`, `cv_mean`, ...).
pub type Metrics = BTreeMap<String, f64>;

/// Free-form training metadata.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Lifecycle status of a model version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionStatus {
    /// Trained and persisted, never served
    Staged,
    /// Serving traffic; at most one version at a time
    Production,
    /// Previously served, replaced by another version
    Archived,
}

impl VersionStatus {
    /// Check if transition to target status is valid
    pub fn can_transition_to(&self, target: VersionStatus) -> bool {
        match (self, target) {
            (VersionStatus::Staged, VersionStatus::Production) => true,
            (VersionStatus::Production, VersionStatus::Archived) => true,
            // Rollback restores an archived version
            (VersionStatus::Archived, VersionStatus::Production) => true,
            (a, b) => *a == b,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VersionStatus::Staged => "staged",
            VersionStatus::Production => "production",
            VersionStatus::Archived => "archived",
        }
    }
}

impl std::fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One trained model. Only `status` and `promoted_at` change after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelVersion {
    pub version_id: String,
    pub created_at: DateTime<Utc>,
    pub metrics: Metrics,
    pub metadata: Metadata,
    pub status: VersionStatus,
    pub promoted_at: Option<DateTime<Utc>>,
    /// Artifact name within the storage backend
    pub artifact: String,
}

impl ModelVersion {
    /// Recorded metric by name.
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }

    pub fn is_production(&self) -> bool {
        self.status == VersionStatus::Production
    }
}

/// Record of a status change, kept in the ledger for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageTransition {
    pub version_id: String,
    pub from: VersionStatus,
    pub to: VersionStatus,
    pub timestamp: DateTime<Utc>,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions() {
        assert!(VersionStatus::Staged.can_transition_to(VersionStatus::Production));
        assert!(VersionStatus::Production.can_transition_to(VersionStatus::Archived));
        assert!(VersionStatus::Archived.can_transition_to(VersionStatus::Production));
        assert!(VersionStatus::Staged.can_transition_to(VersionStatus::Staged));
    }

    #[test]
    fn test_status_invalid_transitions() {
        assert!(!VersionStatus::Production.can_transition_to(VersionStatus::Staged));
        assert!(!VersionStatus::Archived.can_transition_to(VersionStatus::Staged));
        assert!(!VersionStatus::Staged.can_transition_to(VersionStatus::Archived));
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&VersionStatus::Production).unwrap(), "\"production\"");
        assert_eq!(VersionStatus::Archived.to_string(), "archived");
    }
}
