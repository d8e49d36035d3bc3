//! Monitoring alerts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A threshold breach
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AlertKind {
    /// Batch accuracy below the minimum
    LowAccuracy { accuracy: f64, threshold: f64 },
    /// Single prediction slower than allowed (seconds)
    HighLatency { latency: f64, threshold: f64 },
}

impl AlertKind {
    /// Get human-readable description
    pub fn message(&self) -> String {
        match self {
            Self::LowAccuracy { accuracy, threshold } => {
                format!("accuracy {accuracy:.3} below minimum {threshold:.3}")
            }
            Self::HighLatency { latency, threshold } => {
                format!("latency {latency:.3}s above maximum {threshold:.3}s")
            }
        }
    }
}

/// A raised alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub timestamp: DateTime<Utc>,
}

/// Callback type for alerts
pub type AlertCallback = Box<dyn Fn(&Alert) + Send + Sync>;
