//! Serializable wrapper over the model families (the artifact codec).

use serde::{Deserialize, Serialize};

use super::classifier::Classifier;
use super::{GradientBoostedTrees, LogisticRegression, ModelFamily, RandomForest};
use crate::error::{Error, Result};

/// A model of any family; what the artifact store persists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TrainedModel {
    RandomForest(RandomForest),
    GradientBoostedTrees(GradientBoostedTrees),
    LogisticRegression(LogisticRegression),
}

impl TrainedModel {
    /// Family this model was built as. The small default ensemble reports as
    /// a random forest.
    pub fn family(&self) -> ModelFamily {
        match self {
            Self::RandomForest(_) => ModelFamily::RandomForest,
            Self::GradientBoostedTrees(_) => ModelFamily::GradientBoostedTrees,
            Self::LogisticRegression(_) => ModelFamily::LogisticRegression,
        }
    }

    /// Encode as a bincode artifact.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serde::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| Error::Serialization(format!("encoding model: {e}")))
    }

    /// Decode a bincode artifact.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (model, _) = bincode::serde::decode_from_slice(bytes, bincode::config::standard())
            .map_err(|e| Error::Serialization(format!("decoding model: {e}")))?;
        Ok(model)
    }

    fn inner(&self) -> &dyn Classifier {
        match self {
            Self::RandomForest(m) => m,
            Self::GradientBoostedTrees(m) => m,
            Self::LogisticRegression(m) => m,
        }
    }
}

impl Classifier for TrainedModel {
    fn fit(&mut self, x: &[Vec<f64>], y: &[usize]) -> Result<()> {
        match self {
            Self::RandomForest(m) => m.fit(x, y),
            Self::GradientBoostedTrees(m) => m.fit(x, y),
            Self::LogisticRegression(m) => m.fit(x, y),
        }
    }

    fn predict_proba(&self, x: &[Vec<f64>]) -> Vec<Vec<f64>> {
        self.inner().predict_proba(x)
    }

    fn n_classes(&self) -> usize {
        self.inner().n_classes()
    }
}
