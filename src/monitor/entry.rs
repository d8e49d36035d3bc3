//! Prediction log entries and performance records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::eval::ClassificationMetrics;

/// One served prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionLogEntry {
    pub timestamp: DateTime<Utc>,
    /// SHA-256 of the key-sorted JSON input; empty if it could not be computed
    pub input_fingerprint: String,
    pub prediction: usize,
    pub confidence: f64,
    /// Seconds
    pub latency: f64,
}

/// Metrics for one labeled batch of production traffic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub timestamp: DateTime<Utc>,
    pub metrics: ClassificationMetrics,
    pub n_samples: usize,
}

/// Hex SHA-256 of the canonical JSON encoding of `input`.
///
/// Object keys are sorted (serde_json maps are ordered), so logically equal
/// inputs fingerprint identically regardless of field order.
pub fn fingerprint<T: Serialize + ?Sized>(input: &T) -> Result<String> {
    let canonical = serde_json::to_vec(&serde_json::to_value(input)?)?;
    Ok(format!("{:x}", Sha256::digest(&canonical)))
}
