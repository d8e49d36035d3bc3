//! Per-column summary statistics.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::data::FeatureBatch;

/// Guards the relative-change denominators against a zero baseline.
pub const EPSILON: f64 = 1e-10;

/// Summary of one numeric column.
///
/// `std` is the sample standard deviation (n − 1), or 0 for a single value.
/// Quantiles interpolate linearly between order statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnStatistics {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    /// Fraction of rows that were missing (`NaN`)
    pub null_rate: f64,
}

/// Column name → statistics.
pub type BaselineStatistics = BTreeMap<String, ColumnStatistics>;

/// A column (or some of its values) left out of a computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedItem {
    pub column: String,
    pub reason: String,
}

/// Statistics plus whatever had to be skipped to compute them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsOutcome {
    pub statistics: BaselineStatistics,
    pub skipped: Vec<SkippedItem>,
}

/// Summarize every column of `batch`.
///
/// Infinite values are ignored and reported. A column with no finite values
/// at all is skipped.
pub fn calculate_statistics(batch: &FeatureBatch) -> StatisticsOutcome {
    let mut outcome = StatisticsOutcome::default();
    for (name, values) in batch.columns() {
        let nulls = values.iter().filter(|v| v.is_nan()).count();
        let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        let infinite = values.len() - nulls - finite.len();

        if finite.is_empty() {
            outcome.skipped.push(SkippedItem {
                column: name.to_string(),
                reason: format!("no finite values ({nulls} missing, {infinite} infinite)"),
            });
            continue;
        }
        if infinite > 0 {
            outcome.skipped.push(SkippedItem {
                column: name.to_string(),
                reason: format!("{infinite} infinite value(s) ignored"),
            });
        }

        finite.sort_by(f64::total_cmp);
        outcome.statistics.insert(
            name.to_string(),
            summarize(&finite, nulls as f64 / values.len() as f64),
        );
    }
    outcome
}

/// `sorted` is non-empty, finite, ascending.
fn summarize(sorted: &[f64], null_rate: f64) -> ColumnStatistics {
    let n = sorted.len() as f64;
    let mean = sorted.iter().sum::<f64>() / n;
    let std = if sorted.len() > 1 {
        (sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
    } else {
        0.0
    };
    ColumnStatistics {
        mean,
        std,
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        p25: quantile(sorted, 0.25),
        p50: quantile(sorted, 0.50),
        p75: quantile(sorted, 0.75),
        null_rate,
    }
}

/// Linear-interpolated quantile of ascending, non-empty data.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Mean of the relative changes in mean and std.
pub fn drift_score(baseline: &ColumnStatistics, current: &ColumnStatistics) -> f64 {
    let mean_shift = (current.mean - baseline.mean).abs() / (baseline.mean.abs() + EPSILON);
    let std_shift = (current.std - baseline.std).abs() / (baseline.std.abs() + EPSILON);
    (mean_shift + std_shift) / 2.0
}
