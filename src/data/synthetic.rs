//! Synthetic classification data for demos and tests.
//!
//! Each class is a Gaussian blob. `shift` translates every feature, which is
//! how drift is simulated; `label_noise` flips a fraction of labels, which is
//! how concept degradation is simulated.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{FeatureBatch, LabeledBatch};

/// Builder for Gaussian-blob classification datasets.
#[derive(Debug, Clone)]
pub struct SyntheticClassification {
    n_features: usize,
    n_samples: usize,
    n_classes: usize,
    class_sep: f64,
    shift: f64,
    scale: f64,
    label_noise: f64,
    seed: u64,
}

impl SyntheticClassification {
    /// Binary problem with `n_features` features.
    pub fn new(n_features: usize) -> Self {
        Self {
            n_features,
            n_samples: 100,
            n_classes: 2,
            class_sep: 1.5,
            shift: 0.0,
            scale: 1.0,
            label_noise: 0.0,
            seed: 0,
        }
    }

    pub fn samples(mut self, n: usize) -> Self {
        self.n_samples = n;
        self
    }

    pub fn classes(mut self, n: usize) -> Self {
        self.n_classes = n.max(1);
        self
    }

    pub fn class_sep(mut self, sep: f64) -> Self {
        self.class_sep = sep;
        self
    }

    /// Add a constant offset to every feature.
    pub fn shift(mut self, shift: f64) -> Self {
        self.shift = shift;
        self
    }

    /// Multiply the within-class spread.
    pub fn scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Fraction of labels replaced with a different class.
    pub fn label_noise(mut self, fraction: f64) -> Self {
        self.label_noise = fraction.clamp(0.0, 1.0);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Generate the dataset. Classes are balanced (round-robin).
    pub fn generate(&self) -> LabeledBatch {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let names: Vec<String> = (0..self.n_features).map(|j| format!("f{j}")).collect();
        let center_offset = (self.n_classes as f64 - 1.0) / 2.0;

        let mut rows = Vec::with_capacity(self.n_samples);
        let mut labels = Vec::with_capacity(self.n_samples);
        for i in 0..self.n_samples {
            let class = i % self.n_classes;
            let center = self.class_sep * (class as f64 - center_offset);
            let row: Vec<f64> = (0..self.n_features)
                .map(|j| {
                    let sign = if j % 2 == 0 { 1.0 } else { -1.0 };
                    sign * center + self.scale * gaussian(&mut rng) + self.shift
                })
                .collect();
            rows.push(row);

            let label = if self.n_classes > 1 && rng.random::<f64>() < self.label_noise {
                (class + 1 + rng.random_range(0..self.n_classes - 1)) % self.n_classes
            } else {
                class
            };
            labels.push(label);
        }

        // Names and row widths come from the same n_features, so these cannot fail.
        let features = FeatureBatch::from_rows(&names, &rows).unwrap_or_default();
        LabeledBatch::new(features, labels).unwrap_or_default()
    }
}

/// Normal column with the given moments, for drift scenarios.
pub fn normal_column(n: usize, mean: f64, std: f64, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| mean + std * gaussian(&mut rng)).collect()
}

/// Standard normal sample (Box-Muller).
fn gaussian<R: Rng>(rng: &mut R) -> f64 {
    let u1: f64 = rng.random::<f64>().max(f64::MIN_POSITIVE);
    let u2: f64 = rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}
