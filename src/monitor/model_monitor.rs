//! Production model monitor.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::alert::{Alert, AlertCallback, AlertKind};
use super::entry::{fingerprint, PerformanceRecord, PredictionLogEntry};
use crate::clock::{Clock, SystemClock};
use crate::config::MonitorConfig;
use crate::drift::quantile;
use crate::error::Result;
use crate::eval::ModelEvaluator;

/// Rolling view of production behavior. Aggregates are `None` when nothing
/// has been logged in the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringSummary {
    pub total_predictions: usize,
    pub recent_predictions: usize,
    pub avg_latency: Option<f64>,
    pub p95_latency: Option<f64>,
    pub avg_confidence: Option<f64>,
    pub min_confidence: Option<f64>,
    /// Accuracy of the latest performance record
    pub current_accuracy: Option<f64>,
    pub last_update: Option<DateTime<Utc>>,
}

/// Logs predictions, tracks batch performance, and raises alerts.
pub struct ModelMonitor {
    thresholds: MonitorConfig,
    predictions: RwLock<Vec<PredictionLogEntry>>,
    performance: RwLock<Vec<PerformanceRecord>>,
    alerts: RwLock<Vec<Alert>>,
    callbacks: Vec<AlertCallback>,
    evaluator: ModelEvaluator,
    clock: Arc<dyn Clock>,
}

impl Default for ModelMonitor {
    fn default() -> Self {
        Self::new(MonitorConfig::default(), Arc::new(SystemClock))
    }
}

impl std::fmt::Debug for ModelMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelMonitor")
            .field("thresholds", &self.thresholds)
            .field("predictions", &self.prediction_count())
            .finish()
    }
}

impl ModelMonitor {
    pub fn new(thresholds: MonitorConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            thresholds,
            predictions: RwLock::new(Vec::new()),
            performance: RwLock::new(Vec::new()),
            alerts: RwLock::new(Vec::new()),
            callbacks: Vec::new(),
            evaluator: ModelEvaluator::new(),
            clock,
        }
    }

    /// Register callback for alerts
    pub fn on_alert<F>(&mut self, callback: F)
    where
        F: Fn(&Alert) + Send + Sync + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    fn raise(&self, kind: AlertKind) {
        let alert = Alert {
            kind,
            timestamp: self.clock.now(),
        };
        warn!(alert = %alert.kind.message(), "Monitoring alert");
        for callback in &self.callbacks {
            callback(&alert);
        }
        self.alerts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(alert);
    }

    /// Append a prediction to the log. Never fails: an input that cannot be
    /// fingerprinted is logged with an empty fingerprint.
    pub fn log_prediction<T: serde::Serialize + ?Sized>(
        &self,
        input: &T,
        prediction: usize,
        confidence: f64,
        latency: f64,
    ) -> PredictionLogEntry {
        let input_fingerprint = fingerprint(input).unwrap_or_else(|e| {
            warn!(error = %e, "Could not fingerprint prediction input");
            String::new()
        });
        let entry = PredictionLogEntry {
            timestamp: self.clock.now(),
            input_fingerprint,
            prediction,
            confidence,
            latency,
        };
        self.predictions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry.clone());

        if latency > self.thresholds.latency_max {
            self.raise(AlertKind::HighLatency {
                latency,
                threshold: self.thresholds.latency_max,
            });
        }
        entry
    }

    /// Score a labeled batch of production traffic and keep the record.
    pub fn record_performance(
        &self,
        y_true: &[usize],
        y_pred: &[usize],
    ) -> Result<PerformanceRecord> {
        let metrics = self.evaluator.score(y_true, y_pred)?;
        let record = PerformanceRecord {
            timestamp: self.clock.now(),
            metrics,
            n_samples: y_true.len(),
        };
        self.performance
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());

        if metrics.accuracy < self.thresholds.accuracy_min {
            self.raise(AlertKind::LowAccuracy {
                accuracy: metrics.accuracy,
                threshold: self.thresholds.accuracy_min,
            });
        }
        Ok(record)
    }

    /// Aggregate the last `window` predictions.
    pub fn summary(&self, window: usize) -> MonitoringSummary {
        let predictions = self.predictions
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let performance = self.performance
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let recent = &predictions[predictions.len().saturating_sub(window)..];

        let mean = |values: &[f64]| {
            (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
        };
        let mut latencies: Vec<f64> = recent.iter().map(|e| e.latency).collect();
        latencies.sort_by(f64::total_cmp);
        let confidences: Vec<f64> = recent.iter().map(|e| e.confidence).collect();

        let last_update = predictions
            .last()
            .map(|e| e.timestamp)
            .into_iter()
            .chain(performance.last().map(|r| r.timestamp))
            .max();

        MonitoringSummary {
            total_predictions: predictions.len(),
            recent_predictions: recent.len(),
            avg_latency: mean(&latencies),
            p95_latency: (!latencies.is_empty()).then(|| quantile(&latencies, 0.95)),
            avg_confidence: mean(&confidences),
            min_confidence: confidences.iter().copied().reduce(f64::min),
            current_accuracy: performance.last().map(|r| r.metrics.accuracy),
            last_update,
        }
    }

    /// Summary over the configured window.
    pub fn default_summary(&self) -> MonitoringSummary {
        self.summary(self.thresholds.summary_window)
    }

    pub fn prediction_count(&self) -> usize {
        self.predictions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Full prediction log, oldest first.
    pub fn predictions(&self) -> Vec<PredictionLogEntry> {
        self.predictions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Every performance record, oldest first.
    pub fn performance_history(&self) -> Vec<PerformanceRecord> {
        self.performance
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Every alert raised, oldest first.
    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn thresholds(&self) -> &MonitorConfig {
        &self.thresholds
    }
}
