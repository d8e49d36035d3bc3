//! Row-major `f64` features to aprender matrices.

use aprender::primitives::Matrix;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Per-column training statistics used to encode rows for aprender.
///
/// Missing values (`NaN`, or a short row) become the training mean. With
/// `standardize` set, columns are also centered and scaled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct ColumnScaler {
    means: Vec<f64>,
    stds: Vec<f64>,
    standardize: bool,
}

impl ColumnScaler {
    pub(crate) fn fit(x: &[Vec<f64>], standardize: bool) -> Self {
        let width = x.first().map_or(0, Vec::len);
        let mut means = vec![0.0; width];
        let mut stds = vec![1.0; width];
        for j in 0..width {
            let values: Vec<f64> = x.iter()
                .map(|row| row[j])
                .filter(|v| v.is_finite())
                .collect();
            if values.is_empty() {
                continue;
            }
            let n = values.len() as f64;
            let mean = values.iter().sum::<f64>() / n;
            let std = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
            means[j] = mean;
            if std > 1e-12 {
                stds[j] = std;
            }
        }
        Self {
            means,
            stds,
            standardize,
        }
    }

    pub(crate) fn width(&self) -> usize {
        self.means.len()
    }

    pub(crate) fn matrix(&self, x: &[Vec<f64>]) -> Result<Matrix<f32>> {
        let width = self.width();
        let mut data = Vec::with_capacity(x.len() * width);
        for row in x {
            for (j, (mean, std)) in self.means.iter().zip(&self.stds).enumerate() {
                let v = row.get(j)
                    .copied()
                    .filter(|v| v.is_finite())
                    .unwrap_or(*mean);
                let v = if self.standardize { (v - mean) / std } else { v };
                data.push(v as f32);
            }
        }
        Matrix::from_vec(x.len(), width, data)
            .map_err(|e| Error::Validation(format!("building feature matrix: {e}")))
    }
}

/// Two-class distribution from the positive-class probability.
pub(crate) fn binary_distribution(p: f32) -> Vec<f64> {
    let p = f64::from(p).clamp(0.0, 1.0);
    vec![1.0 - p, p]
}

/// Scale `scores` to sum to one; all-zero scores become uniform.
pub(crate) fn normalize(mut scores: Vec<f64>) -> Vec<f64> {
    let total: f64 = scores.iter().sum();
    if total > 0.0 {
        scores.iter_mut().for_each(|s| *s /= total);
    } else if !scores.is_empty() {
        let uniform = 1.0 / scores.len() as f64;
        scores.iter_mut().for_each(|s| *s = uniform);
    }
    scores
}
