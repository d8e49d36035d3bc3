//! Random forest over aprender's `RandomForestClassifier`.

use aprender::tree::RandomForestClassifier;
use serde::{Deserialize, Serialize};

use super::classifier::{check_training_data, Classifier};
use super::scaler::{normalize, ColumnScaler};
use crate::error::{Error, Result};

/// Bagged decision trees with averaged class votes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    n_trees: usize,
    max_depth: usize,
    seed: u64,
    scaler: ColumnScaler,
    model: Option<RandomForestClassifier>,
    n_classes: usize,
}

impl RandomForest {
    /// Untrained forest of `n_trees` trees no deeper than `max_depth`.
    pub fn new(n_trees: usize, max_depth: usize, seed: u64) -> Self {
        Self {
            n_trees: n_trees.max(1),
            max_depth,
            seed,
            scaler: ColumnScaler::default(),
            model: None,
            n_classes: 0,
        }
    }

    pub fn n_trees(&self) -> usize {
        self.n_trees
    }

    pub fn is_fitted(&self) -> bool {
        self.model.is_some()
    }
}

impl Classifier for RandomForest {
    fn fit(&mut self, x: &[Vec<f64>], y: &[usize]) -> Result<()> {
        let n_classes = check_training_data(x, y)?;
        let scaler = ColumnScaler::fit(x, false);
        let features = scaler.matrix(x)?;

        let mut model = RandomForestClassifier::new(self.n_trees)
            .with_max_depth(self.max_depth)
            .with_random_state(self.seed);
        model
            .fit(&features, y)
            .map_err(|e| Error::Retrain(format!("random forest: {e}")))?;

        self.scaler = scaler;
        self.model = Some(model);
        self.n_classes = n_classes;
        Ok(())
    }

    fn predict_proba(&self, x: &[Vec<f64>]) -> Vec<Vec<f64>> {
        let (Some(model), Ok(features)) = (&self.model, self.scaler.matrix(x)) else {
            return vec![Vec::new(); x.len()];
        };
        let proba = model.predict_proba(&features);
        let (rows, cols) = proba.shape();
        (0..rows)
            .map(|i| {
                let scores = (0..self.n_classes)
                    .map(|j| if j < cols { f64::from(proba.get(i, j)) } else { 0.0 })
                    .collect();
                normalize(scores)
            })
            .collect()
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }
}
