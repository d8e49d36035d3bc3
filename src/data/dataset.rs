//! Labeled datasets and their JSON file format.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::batch::FeatureBatch;
use crate::error::{Error, Result};

/// Features plus one class label per row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabeledBatch {
    features: FeatureBatch,
    labels: Vec<usize>,
}

impl LabeledBatch {
    /// Pair features with labels. Lengths must agree.
    pub fn new(features: FeatureBatch, labels: Vec<usize>) -> Result<Self> {
        if features.n_rows() != labels.len() {
            return Err(Error::Validation(format!(
                "{} feature rows but {} labels",
                features.n_rows(),
                labels.len()
            )));
        }
        Ok(Self { features, labels })
    }

    /// Feature table.
    pub fn features(&self) -> &FeatureBatch {
        &self.features
    }

    /// Class labels.
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True when there are no rows.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Subset of rows by index.
    pub fn select(&self, indices: &[usize]) -> Self {
        let n = self.len();
        Self {
            features: self.features.select(indices),
            labels: indices
                .iter()
                .filter(|&&i| i < n)
                .map(|&i| self.labels[i])
                .collect(),
        }
    }

    /// Union of two datasets (rows of `other` after rows of `self`).
    pub fn concat(&self, other: &Self) -> Result<Self> {
        let features = self.features.concat(&other.features)?;
        let labels = self.labels.iter().chain(&other.labels).copied().collect();
        Self::new(features, labels)
    }

    /// Load from a JSON dataset file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::io(format!("reading dataset {}", path.display()), e))?;
        let file: DatasetFile = serde_json::from_str(&content)?;
        file.into_batch()
    }
}

/// On-disk dataset layout:
///
/// ```json
/// { "features": { "x": [1.0, 2.0], "y": [0.5, null] }, "labels": [0, 1] }
/// ```
///
/// `null` feature values load as `NaN` (missing). Columns are ordered by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetFile {
    pub features: BTreeMap<String, Vec<Option<f64>>>,
    pub labels: Vec<usize>,
}

impl DatasetFile {
    /// Convert to an in-memory batch.
    pub fn into_batch(self) -> Result<LabeledBatch> {
        let columns = self
            .features
            .into_iter()
            .map(|(name, values)| {
                let values = values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect();
                (name, values)
            })
            .collect();
        LabeledBatch::new(FeatureBatch::from_columns(columns)?, self.labels)
    }

    /// Snapshot a batch for writing. Missing values become `null`.
    pub fn from_batch(batch: &LabeledBatch) -> Self {
        let features = batch
            .features()
            .columns()
            .map(|(name, values)| {
                let values = values.iter().map(|v| (!v.is_nan()).then_some(*v)).collect();
                (name.to_string(), values)
            })
            .collect();
        Self {
            features,
            labels: batch.labels().to_vec(),
        }
    }
}
