//! Logistic regression over aprender's binary `LogisticRegression`.
//!
//! More than two classes are fitted one-vs-rest. Features are standardized
//! with the training statistics, so missing values contribute nothing.

use aprender::classification::LogisticRegression as BinaryLogistic;
use aprender::primitives::Matrix;
use serde::{Deserialize, Serialize};

use super::classifier::{check_training_data, Classifier};
use super::scaler::{binary_distribution, normalize, ColumnScaler};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    max_iter: usize,
    learning_rate: f32,
    scaler: ColumnScaler,
    /// One model for binary targets, one per class otherwise
    models: Vec<BinaryLogistic>,
    n_classes: usize,
}

impl LogisticRegression {
    pub fn new(max_iter: usize, learning_rate: f32) -> Self {
        Self {
            max_iter: max_iter.max(1),
            learning_rate,
            scaler: ColumnScaler::default(),
            models: Vec::new(),
            n_classes: 0,
        }
    }

    fn fit_binary(&self, x: &Matrix<f32>, y: &[usize]) -> Result<BinaryLogistic> {
        let mut model = BinaryLogistic::new()
            .with_learning_rate(self.learning_rate)
            .with_max_iter(self.max_iter);
        model
            .fit(x, y)
            .map_err(|e| Error::Retrain(format!("logistic regression: {e}")))?;
        Ok(model)
    }
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new(1000, 0.1)
    }
}

impl Classifier for LogisticRegression {
    fn fit(&mut self, x: &[Vec<f64>], y: &[usize]) -> Result<()> {
        let n_classes = check_training_data(x, y)?;
        let scaler = ColumnScaler::fit(x, true);
        let features = scaler.matrix(x)?;

        let models = if n_classes <= 2 {
            vec![self.fit_binary(&features, y)?]
        } else {
            (0..n_classes)
                .map(|k| {
                    let one_vs_rest: Vec<usize> = y.iter().map(|&l| usize::from(l == k)).collect();
                    self.fit_binary(&features, &one_vs_rest)
                })
                .collect::<Result<Vec<_>>>()?
        };

        self.scaler = scaler;
        self.models = models;
        self.n_classes = n_classes;
        Ok(())
    }

    fn predict_proba(&self, x: &[Vec<f64>]) -> Vec<Vec<f64>> {
        let Ok(features) = self.scaler.matrix(x) else {
            return vec![Vec::new(); x.len()];
        };
        match self.models.as_slice() {
            [] => vec![Vec::new(); x.len()],
            [binary] => {
                let positive = binary.predict_proba(&features);
                positive
                    .as_slice()
                    .iter()
                    .copied()
                    .map(binary_distribution)
                    .collect()
            }
            per_class => {
                let columns: Vec<Vec<f32>> = per_class
                    .iter()
                    .map(|m| m.predict_proba(&features).as_slice().to_vec())
                    .collect();
                (0..x.len())
                    .map(|i| normalize(columns.iter().map(|c| f64::from(c[i])).collect()))
                    .collect()
            }
        }
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }
}
