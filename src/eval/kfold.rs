//! K-Fold cross-validation splitter

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Shuffled (by default), seeded K-Fold splitter.
#[derive(Clone, Debug)]
pub struct KFold {
    n_splits: usize,
    shuffle: bool,
    seed: u64,
}

impl KFold {
    pub fn new(n_splits: usize) -> Self {
        Self {
            n_splits: n_splits.max(2),
            shuffle: true,
            seed: 42,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn without_shuffle(mut self) -> Self {
        self.shuffle = false;
        self
    }

    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// `(train, test)` index pairs. The first `n_samples % k` folds get one
    /// extra test sample. Folds are empty when `n_samples < k`.
    pub fn split(&self, n_samples: usize) -> Vec<(Vec<usize>, Vec<usize>)> {
        let mut indices: Vec<usize> = (0..n_samples).collect();
        if self.shuffle {
            indices.shuffle(&mut StdRng::seed_from_u64(self.seed));
        }

        let fold_size = n_samples / self.n_splits;
        let remainder = n_samples % self.n_splits;
        let mut start = 0;
        (0..self.n_splits)
            .map(|i| {
                let end = start + fold_size + usize::from(i < remainder);
                let test = indices[start..end].to_vec();
                let train = indices[..start]
                    .iter()
                    .chain(&indices[end..])
                    .copied()
                    .collect();
                start = end;
                (train, test)
            })
            .collect()
    }
}
