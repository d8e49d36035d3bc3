//! Data drift detection.
//!
//! Columns are summarized by mean, standard deviation, range, quartiles, and
//! missing rate. A column's drift score is the average relative change of
//! its mean and standard deviation versus the baseline; a batch drifts when
//! its worst column scores above the threshold.

mod detector;
mod report;
mod stats;

#[cfg(test)]
mod tests;

pub use detector::{DriftDetector, DEFAULT_THRESHOLD};
pub use report::{DriftCallback, DriftReport, Severity};
pub use stats::{
    calculate_statistics, drift_score, quantile, BaselineStatistics, ColumnStatistics, SkippedItem,
    StatisticsOutcome, EPSILON,
};
