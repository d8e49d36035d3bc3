//! Gradient boosting over aprender's `GradientBoostingClassifier`.

use aprender::tree::GradientBoostingClassifier;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::classifier::{check_training_data, Classifier};
use super::scaler::{binary_distribution, ColumnScaler};
use crate::error::{Error, Result};

/// Binary gradient boosting. Fitting multi-class targets is an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostedTrees {
    n_estimators: usize,
    learning_rate: f32,
    max_depth: usize,
    scaler: ColumnScaler,
    model: Option<GradientBoostingClassifier>,
}

impl GradientBoostedTrees {
    pub fn new(n_estimators: usize, learning_rate: f32, max_depth: usize) -> Self {
        Self {
            n_estimators: n_estimators.max(1),
            learning_rate,
            max_depth,
            scaler: ColumnScaler::default(),
            model: None,
        }
    }
}

impl Classifier for GradientBoostedTrees {
    fn fit(&mut self, x: &[Vec<f64>], y: &[usize]) -> Result<()> {
        let n_classes = check_training_data(x, y)?;
        if n_classes > 2 {
            return Err(Error::Retrain(format!(
                "gradient boosting supports binary labels only, got {n_classes} classes"
            )));
        }
        let scaler = ColumnScaler::fit(x, false);
        let features = scaler.matrix(x)?;

        let mut model = GradientBoostingClassifier::new()
            .with_n_estimators(self.n_estimators)
            .with_learning_rate(self.learning_rate)
            .with_max_depth(self.max_depth);
        model
            .fit(&features, y)
            .map_err(|e| Error::Retrain(format!("gradient boosting: {e}")))?;

        self.scaler = scaler;
        self.model = Some(model);
        Ok(())
    }

    fn predict_proba(&self, x: &[Vec<f64>]) -> Vec<Vec<f64>> {
        let (Some(model), Ok(features)) = (&self.model, self.scaler.matrix(x)) else {
            return vec![Vec::new(); x.len()];
        };
        match model.predict_proba(&features) {
            Ok(positive) => positive.into_iter().map(binary_distribution).collect(),
            Err(e) => {
                warn!(error = %e, "Gradient boosting prediction failed");
                vec![Vec::new(); x.len()]
            }
        }
    }

    fn n_classes(&self) -> usize {
        if self.model.is_some() {
            2
        } else {
            0
        }
    }
}
