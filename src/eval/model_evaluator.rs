//! Model evaluator: held-out scoring and cross-validation.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::confusion::ConfusionMatrix;
use super::kfold::KFold;
use super::metrics::ClassificationMetrics;
use crate::data::LabeledBatch;
use crate::error::{Error, Result};
use crate::models::{Classifier, ModelFamily};

/// Per-fold accuracies with their mean and sample standard deviation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossValidation {
    pub scores: Vec<f64>,
    pub mean: f64,
    pub std: f64,
}

/// Scores classifiers against labeled data.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelEvaluator;

impl ModelEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Predict `x` with `model` and score against `y`.
    pub fn evaluate(
        &self,
        model: &dyn Classifier,
        x: &[Vec<f64>],
        y: &[usize],
    ) -> Result<ClassificationMetrics> {
        check_lengths(x.len(), y.len())?;
        self.score(y, &model.predict(x))
    }

    /// [`evaluate`](Self::evaluate) on a labeled batch.
    pub fn evaluate_batch(
        &self,
        model: &dyn Classifier,
        batch: &LabeledBatch,
    ) -> Result<ClassificationMetrics> {
        self.evaluate(model, &batch.features().to_rows(), batch.labels())
    }

    /// Metrics from label vectors.
    ///
    /// Precision, recall and F1 are reported only when `y_true` holds exactly
    /// two distinct labels, with the larger one as the positive class.
    pub fn score(&self, y_true: &[usize], y_pred: &[usize]) -> Result<ClassificationMetrics> {
        check_lengths(y_true.len(), y_pred.len())?;
        let cm = ConfusionMatrix::from_labels(y_true, y_pred);
        let distinct: BTreeSet<usize> = y_true.iter().copied().collect();
        if distinct.len() != 2 {
            return Ok(ClassificationMetrics::accuracy_only(cm.accuracy()));
        }
        let positive = distinct.last().copied().unwrap_or_default();
        Ok(ClassificationMetrics {
            accuracy: cm.accuracy(),
            precision: Some(cm.precision(positive)),
            recall: Some(cm.recall(positive)),
            f1: Some(cm.f1(positive)),
        })
    }

    /// K-fold accuracy of a freshly built `family` model, folds in parallel.
    pub fn cross_validate(
        &self,
        family: ModelFamily,
        seed: u64,
        x: &[Vec<f64>],
        y: &[usize],
        kfold: &KFold,
    ) -> Result<CrossValidation> {
        check_lengths(x.len(), y.len())?;
        let folds: Vec<(Vec<usize>, Vec<usize>)> = kfold
            .split(x.len())
            .into_iter()
            .filter(|(train, test)| !train.is_empty() && !test.is_empty())
            .collect();
        if folds.is_empty() {
            return Err(Error::Validation(format!(
                "{} rows are too few for {}-fold cross-validation",
                x.len(),
                kfold.n_splits()
            )));
        }

        let scores = folds
            .par_iter()
            .map(|(train, test)| -> Result<f64> {
                let pick_x = |idx: &[usize]| idx.iter().map(|&i| x[i].clone()).collect::<Vec<_>>();
                let pick_y = |idx: &[usize]| idx.iter().map(|&i| y[i]).collect::<Vec<_>>();
                let mut model = family.build(seed);
                model.fit(&pick_x(train), &pick_y(train))?;
                Ok(self.evaluate(&model, &pick_x(test), &pick_y(test))?.accuracy)
            })
            .collect::<Result<Vec<f64>>>()?;

        let n = scores.len() as f64;
        let mean = scores.iter().sum::<f64>() / n;
        let std = if scores.len() > 1 {
            (scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
        } else {
            0.0
        };
        Ok(CrossValidation { scores, mean, std })
    }
}

fn check_lengths(a: usize, b: usize) -> Result<()> {
    if a == 0 {
        return Err(Error::Validation("cannot evaluate on an empty batch".into()));
    }
    if a != b {
        return Err(Error::Validation(format!("length mismatch: {a} vs {b}")));
    }
    Ok(())
}
