//! Stratified train/test split.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Row indices of a train/test split, each ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Split `labels` so each class keeps its share in the test set.
///
/// Each class with at least two rows contributes `round(n × test_fraction)`
/// rows to the test set, at least one and never all of them. Singleton
/// classes stay in training.
pub fn train_test_split(labels: &[usize], test_fraction: f64, seed: u64) -> Result<TrainTestSplit> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(Error::Validation(format!(
            "test_fraction must be in (0, 1), got {test_fraction}"
        )));
    }

    let mut by_class: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (i, &label) in labels.iter().enumerate() {
        by_class.entry(label).or_default().push(i);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(labels.len());
    let mut test = Vec::new();
    for mut rows in by_class.into_values() {
        rows.shuffle(&mut rng);
        let n = rows.len();
        let n_test = if n < 2 {
            0
        } else {
            ((n as f64 * test_fraction).round() as usize).clamp(1, n - 1)
        };
        test.extend_from_slice(&rows[..n_test]);
        train.extend_from_slice(&rows[n_test..]);
    }

    if train.is_empty() || test.is_empty() {
        return Err(Error::Validation(format!(
            "cannot split {} rows into non-empty train and test sets",
            labels.len()
        )));
    }
    train.sort_unstable();
    test.sort_unstable();
    Ok(TrainTestSplit { train, test })
}
