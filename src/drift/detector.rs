//! Drift detector: a baseline plus a history of checks against it.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info, warn};

use super::report::{DriftCallback, DriftReport};
use super::stats::{
    calculate_statistics, drift_score, BaselineStatistics, SkippedItem, StatisticsOutcome,
};
use crate::clock::{Clock, SystemClock};
use crate::data::FeatureBatch;
use crate::error::{Error, Result};

/// Default drift threshold on the max per-column score.
pub const DEFAULT_THRESHOLD: f64 = 0.1;

/// Flags shifts in per-column mean and standard deviation.
///
/// The first batch checked without a baseline becomes the baseline. Each
/// later check scores every column present in both the baseline and the
/// batch and is appended to the history.
pub struct DriftDetector {
    baseline: RwLock<Option<BaselineStatistics>>,
    history: RwLock<Vec<DriftReport>>,
    callbacks: Vec<DriftCallback>,
    clock: Arc<dyn Clock>,
}

impl Default for DriftDetector {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl std::fmt::Debug for DriftDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriftDetector")
            .field("has_baseline", &self.has_baseline())
            .field("history", &self.history.read().unwrap_or_else(PoisonError::into_inner).len())
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

impl DriftDetector {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            baseline: RwLock::new(None),
            history: RwLock::new(Vec::new()),
            callbacks: Vec::new(),
            clock,
        }
    }

    /// Register callback for drift events
    ///
    /// Invoked with every report that has `drift_detected`.
    pub fn on_drift<F>(&mut self, callback: F)
    where
        F: Fn(&DriftReport) + Send + Sync + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Per-column statistics of `batch`.
    pub fn calculate_statistics(&self, batch: &FeatureBatch) -> StatisticsOutcome {
        calculate_statistics(batch)
    }

    /// Check `batch` against the baseline.
    ///
    /// Without a baseline the batch establishes one and the report (which
    /// never flags drift) is not added to the history. A batch without any
    /// usable column is a [`Error::Validation`] and changes nothing.
    pub fn detect_drift(&self, batch: &FeatureBatch, threshold: f64) -> Result<DriftReport> {
        let StatisticsOutcome {
            statistics,
            mut skipped,
        } = usable_statistics(batch, "drift input")?;

        let Some(baseline) = self.baseline() else {
            info!(columns = statistics.len(), "Established drift baseline");
            self.set_baseline_statistics(statistics);
            return Ok(DriftReport {
                drift_detected: false,
                max_drift_score: 0.0,
                drift_scores: Default::default(),
                timestamp: self.clock.now(),
                baseline_established: true,
                skipped,
            });
        };

        let mut drift_scores = std::collections::BTreeMap::new();
        for (column, current) in &statistics {
            match baseline.get(column) {
                Some(base) => {
                    drift_scores.insert(column.clone(), drift_score(base, current));
                }
                None => skipped.push(SkippedItem {
                    column: column.clone(),
                    reason: "not in baseline".into(),
                }),
            }
        }
        let max_drift_score = drift_scores.values().copied().fold(0.0, f64::max);
        let report = DriftReport {
            drift_detected: max_drift_score > threshold,
            max_drift_score,
            drift_scores,
            timestamp: self.clock.now(),
            baseline_established: false,
            skipped,
        };

        if report.drift_detected {
            warn!(
                max_drift_score = report.max_drift_score,
                threshold,
                columns = ?report.drifted_columns(threshold),
                "Data drift detected"
            );
            for callback in &self.callbacks {
                callback(&report);
            }
        } else {
            debug!(max_drift_score = report.max_drift_score, "No drift");
        }

        self.history
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(report.clone());
        Ok(report)
    }

    /// Replace the baseline with the statistics of `batch`.
    ///
    /// The old baseline is kept when `batch` has no usable column.
    pub fn update_baseline(&self, batch: &FeatureBatch) -> Result<()> {
        let outcome = usable_statistics(batch, "baseline input")?;
        info!(
            columns = outcome.statistics.len(),
            rows = batch.n_rows(),
            "Updated drift baseline"
        );
        self.set_baseline_statistics(outcome.statistics);
        Ok(())
    }

    /// Replace the baseline directly.
    pub fn set_baseline_statistics(&self, statistics: BaselineStatistics) {
        *self.baseline.write().unwrap_or_else(PoisonError::into_inner) = Some(statistics);
    }

    pub fn baseline(&self) -> Option<BaselineStatistics> {
        self.baseline
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn has_baseline(&self) -> bool {
        self.baseline
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Every report since creation, oldest first.
    pub fn history(&self) -> Vec<DriftReport> {
        self.history
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The last `n` reports, oldest first.
    pub fn recent(&self, n: usize) -> Vec<DriftReport> {
        let history = self.history.read().unwrap_or_else(PoisonError::into_inner);
        history[history.len().saturating_sub(n)..].to_vec()
    }
}

/// Statistics of `batch`, or a validation error when no column is usable.
fn usable_statistics(batch: &FeatureBatch, what: &str) -> Result<StatisticsOutcome> {
    let outcome = calculate_statistics(batch);
    for item in &outcome.skipped {
        warn!(column = %item.column, reason = %item.reason, input = what, "Skipped column");
    }
    if outcome.statistics.is_empty() {
        return Err(Error::Validation(format!(
            "{what} has no usable columns ({} rows, {} skipped)",
            batch.n_rows(),
            outcome.skipped.len()
        )));
    }
    Ok(outcome)
}
