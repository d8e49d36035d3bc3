//! Confusion matrix over dense class indices

/// Element `[i][j]` counts samples with true label `i` predicted as `j`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfusionMatrix {
    matrix: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    /// Build from paired labels. Extra elements of the longer slice are ignored.
    pub fn from_labels(y_true: &[usize], y_pred: &[usize]) -> Self {
        let n_classes = y_true.iter().chain(y_pred).max().map_or(0, |&m| m + 1);
        let mut matrix = vec![vec![0; n_classes]; n_classes];
        for (&t, &p) in y_true.iter().zip(y_pred) {
            matrix[t][p] += 1;
        }
        Self { matrix }
    }

    pub fn n_classes(&self) -> usize {
        self.matrix.len()
    }

    /// Count at `[true_label][predicted_label]`, 0 outside the matrix.
    pub fn get(&self, true_label: usize, predicted_label: usize) -> usize {
        self.matrix
            .get(true_label)
            .and_then(|row| row.get(predicted_label))
            .copied()
            .unwrap_or(0)
    }

    pub fn true_positives(&self, class: usize) -> usize {
        self.get(class, class)
    }

    /// Predicted as `class` but wasn't
    pub fn false_positives(&self, class: usize) -> usize {
        (0..self.n_classes()).filter(|&i| i != class).map(|i| self.get(i, class)).sum()
    }

    /// Was `class` but predicted differently
    pub fn false_negatives(&self, class: usize) -> usize {
        (0..self.n_classes()).filter(|&j| j != class).map(|j| self.get(class, j)).sum()
    }

    pub fn total(&self) -> usize {
        self.matrix.iter().flatten().sum()
    }

    /// Fraction on the diagonal; 0 for an empty matrix.
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let correct: usize = (0..self.n_classes()).map(|i| self.matrix[i][i]).sum();
        correct as f64 / total as f64
    }

    /// Precision for `class`; 0 when nothing was predicted as `class`.
    pub fn precision(&self, class: usize) -> f64 {
        ratio(self.true_positives(class), self.true_positives(class) + self.false_positives(class))
    }

    /// Recall for `class`; 0 when `class` never occurs.
    pub fn recall(&self, class: usize) -> f64 {
        ratio(self.true_positives(class), self.true_positives(class) + self.false_negatives(class))
    }

    /// Harmonic mean of precision and recall; 0 when both are 0.
    pub fn f1(&self, class: usize) -> f64 {
        let (p, r) = (self.precision(class), self.recall(class));
        if p + r > 0.0 {
            2.0 * p * r / (p + r)
        } else {
            0.0
        }
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}
