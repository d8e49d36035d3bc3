//! Retraining trigger policy.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::RetrainConfig;

/// A condition that calls for retraining
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RetrainTrigger {
    /// Relative accuracy drop versus the last known good model
    PerformanceDrop { drop: f64, threshold: f64 },
    /// The drift detector flagged the latest batch
    DataDrift,
    /// The production model is older than allowed
    Staleness { days: i64, max_days: i64 },
}

impl fmt::Display for RetrainTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PerformanceDrop { drop, threshold } => {
                write!(f, "performance drop {:.1}% > {:.1}%", drop * 100.0, threshold * 100.0)
            }
            Self::DataDrift => write!(f, "data drift detected"),
            Self::Staleness { days, max_days } => {
                write!(f, "{days} days since last retrain > {max_days}")
            }
        }
    }
}

/// Which triggers fired for one decision.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrainDecision {
    pub triggers: Vec<RetrainTrigger>,
}

impl RetrainDecision {
    pub fn should_retrain(&self) -> bool {
        !self.triggers.is_empty()
    }

    /// Triggers joined for logs and version metadata.
    pub fn reason(&self) -> String {
        if self.triggers.is_empty() {
            return "no trigger".to_string();
        }
        self.triggers.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
    }
}

/// Thresholds for the retrain decision.
#[derive(Clone, Debug, PartialEq)]
pub struct RetrainPolicy {
    pub performance_drop_threshold: f64,
    pub max_days_since_retrain: i64,
}

impl Default for RetrainPolicy {
    fn default() -> Self {
        Self {
            performance_drop_threshold: 0.05,
            max_days_since_retrain: 30,
        }
    }
}

impl From<&RetrainConfig> for RetrainPolicy {
    fn from(config: &RetrainConfig) -> Self {
        Self {
            performance_drop_threshold: config.performance_drop_threshold,
            max_days_since_retrain: config.max_days_since_retrain,
        }
    }
}

impl RetrainPolicy {
    /// Evaluate every trigger. Each comparison is strict.
    pub fn decide(
        &self,
        performance_drop: f64,
        drift_detected: bool,
        days_since_retrain: i64,
    ) -> RetrainDecision {
        let mut triggers = Vec::new();
        if performance_drop > self.performance_drop_threshold {
            triggers.push(RetrainTrigger::PerformanceDrop {
                drop: performance_drop,
                threshold: self.performance_drop_threshold,
            });
        }
        if drift_detected {
            triggers.push(RetrainTrigger::DataDrift);
        }
        if days_since_retrain > self.max_days_since_retrain {
            triggers.push(RetrainTrigger::Staleness {
                days: days_since_retrain,
                max_days: self.max_days_since_retrain,
            });
        }
        RetrainDecision { triggers }
    }
}
