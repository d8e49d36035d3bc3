//! Classifier trait definition

use crate::error::{Error, Result};

/// Trainable classifier.
///
/// Labels are dense class indices `0..n_classes`. Rows are row-major feature
/// vectors; all rows passed to one model must have the same width.
pub trait Classifier: Send + Sync {
    /// Train on `x` with labels `y`.
    fn fit(&mut self, x: &[Vec<f64>], y: &[usize]) -> Result<()>;

    /// Per-class probabilities for each row.
    fn predict_proba(&self, x: &[Vec<f64>]) -> Vec<Vec<f64>>;

    /// Number of classes seen during training (0 before `fit`).
    fn n_classes(&self) -> usize;

    /// Most probable class for each row.
    fn predict(&self, x: &[Vec<f64>]) -> Vec<usize> {
        self.predict_proba(x).iter().map(|p| argmax(p)).collect()
    }
}

/// Index of the largest value; ties resolve to the lowest index.
pub(crate) fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

/// Shared `fit` preconditions.
pub(crate) fn check_training_data(x: &[Vec<f64>], y: &[usize]) -> Result<usize> {
    if x.is_empty() {
        return Err(Error::Validation("cannot fit on an empty dataset".into()));
    }
    if x.len() != y.len() {
        return Err(Error::Validation(format!(
            "{} rows but {} labels",
            x.len(),
            y.len()
        )));
    }
    let width = x[0].len();
    if let Some(i) = x.iter().position(|row| row.len() != width) {
        return Err(Error::Validation(format!("row {i} has a different width than row 0")));
    }
    Ok(y.iter().copied().max().map_or(0, |m| m + 1))
}
