//! Closed set of constructible model families.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{GradientBoostedTrees, LogisticRegression, RandomForest, TrainedModel};

/// Model family requested by name at retrain time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelFamily {
    /// 100 trees, depth 10
    RandomForest,
    /// Binary targets only
    GradientBoostedTrees,
    LogisticRegression,
    /// Small forest (50 trees, depth 10) used for unrecognized names
    DefaultEnsemble,
}

impl ModelFamily {
    /// Parse a family name, falling back to [`ModelFamily::DefaultEnsemble`].
    pub fn parse(name: &str) -> Self {
        Self::try_parse(name).unwrap_or(Self::DefaultEnsemble)
    }

    /// Parse a family name; `None` when unrecognized.
    pub fn try_parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "random_forest" | "rf" => Some(Self::RandomForest),
            "gradient_boosted_trees" | "gbt" | "xgboost" | "lightgbm" => {
                Some(Self::GradientBoostedTrees)
            }
            "logistic_regression" | "logistic" => Some(Self::LogisticRegression),
            "default_ensemble" | "default" => Some(Self::DefaultEnsemble),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RandomForest => "random_forest",
            Self::GradientBoostedTrees => "gradient_boosted_trees",
            Self::LogisticRegression => "logistic_regression",
            Self::DefaultEnsemble => "default_ensemble",
        }
    }

    /// Untrained model of this family.
    pub fn build(&self, seed: u64) -> TrainedModel {
        match self {
            Self::RandomForest => TrainedModel::RandomForest(RandomForest::new(100, 10, seed)),
            Self::GradientBoostedTrees => {
                TrainedModel::GradientBoostedTrees(GradientBoostedTrees::new(100, 0.1, 3))
            }
            Self::LogisticRegression => {
                TrainedModel::LogisticRegression(LogisticRegression::default())
            }
            Self::DefaultEnsemble => TrainedModel::RandomForest(RandomForest::new(50, 10, seed)),
        }
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
