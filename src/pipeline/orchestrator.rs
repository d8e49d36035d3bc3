//! The pipeline orchestrator.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

use tracing::{info, warn};

use super::outcome::{BatchOutcome, LifecycleSummary, PipelinePhase, PipelineStatus, Prediction};
use crate::clock::{Clock, SystemClock};
use crate::config::PipelineConfig;
use crate::data::LabeledBatch;
use crate::drift::{DriftDetector, DriftReport};
use crate::error::{Error, Result};
use crate::eval::ModelEvaluator;
use crate::models::{Classifier, TrainedModel};
use crate::monitor::{Alert, ModelMonitor};
use crate::retrain::{MeasuredIncumbent, RetrainDecisionEngine, RetrainResult};
use crate::store::{ModelArtifactStore, ModelVersion};

/// Reports kept in the lifecycle summary.
const SUMMARY_DRIFT_REPORTS: usize = 5;

#[derive(Debug, Default)]
struct LifecycleState {
    /// Everything trained on or observed so far
    training_data: Option<LabeledBatch>,
    /// Accuracy the current production model is held to
    last_known_good: Option<f64>,
    baseline_version: Option<String>,
}

/// Clears the running flag when a lifecycle step ends, however it ends.
struct RunningGuard<'a>(&'a AtomicBool);

impl<'a> RunningGuard<'a> {
    fn new(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Composes the store, drift detector, retrain engine, and monitor into one
/// train → watch → retrain → gate lifecycle.
pub struct PipelineOrchestrator {
    config: PipelineConfig,
    store: Arc<ModelArtifactStore>,
    detector: DriftDetector,
    engine: RetrainDecisionEngine,
    monitor: ModelMonitor,
    evaluator: ModelEvaluator,
    state: RwLock<LifecycleState>,
    serving: RwLock<Option<(String, Arc<TrainedModel>)>>,
    running: AtomicBool,
}

impl std::fmt::Debug for PipelineOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineOrchestrator")
            .field("store", &self.store)
            .field("detector", &self.detector)
            .field("engine", &self.engine)
            .field("monitor", &self.monitor)
            .finish()
    }
}

impl PipelineOrchestrator {
    /// Pipeline over the on-disk store in `config.store.model_dir`.
    pub fn open(config: PipelineConfig) -> Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let store = ModelArtifactStore::open(&config.store.model_dir)?;
        Ok(Self::with_store(config, Arc::new(store), clock))
    }

    /// Pipeline with an in-memory store, for tests and simulations.
    pub fn in_memory(config: PipelineConfig, clock: Arc<dyn Clock>) -> Self {
        let store = Arc::new(ModelArtifactStore::in_memory(Arc::clone(&clock)));
        Self::with_store(config, store, clock)
    }

    pub fn with_store(
        config: PipelineConfig,
        store: Arc<ModelArtifactStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let engine =
            RetrainDecisionEngine::new(&config.retrain, Arc::clone(&store), Arc::clone(&clock));
        Self {
            detector: DriftDetector::new(Arc::clone(&clock)),
            engine,
            monitor: ModelMonitor::new(config.monitor.clone(), clock),
            evaluator: ModelEvaluator::new(),
            state: RwLock::new(LifecycleState::default()),
            serving: RwLock::new(None),
            running: AtomicBool::new(false),
            store,
            config,
        }
    }

    /// Register callback for drift events
    pub fn on_drift<F>(&mut self, callback: F)
    where
        F: Fn(&DriftReport) + Send + Sync + 'static,
    {
        self.detector.on_drift(callback);
    }

    /// Register callback for monitoring alerts
    pub fn on_alert<F>(&mut self, callback: F)
    where
        F: Fn(&Alert) + Send + Sync + 'static,
    {
        self.monitor.on_alert(callback);
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, LifecycleState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, LifecycleState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Train and promote the first model, and take `data` as the drift
    /// baseline. A training failure is an error here: there is no incumbent
    /// to fall back to.
    pub fn initialize(&self, data: &LabeledBatch) -> Result<RetrainResult> {
        let _running = RunningGuard::new(&self.running);
        let model_type = &self.config.retrain.model_type;
        info!(rows = data.len(), model_type = %model_type, "Training baseline model");

        let result = self.engine.retrain(data, model_type, "initial training");
        if !result.is_completed() {
            return Err(Error::Retrain(result.error.clone().unwrap_or_default()));
        }
        self.engine.promote(&result)?;
        self.detector.update_baseline(data.features())?;

        let mut state = self.write_state();
        state.training_data = Some(data.clone());
        state.last_known_good = result.accuracy();
        state.baseline_version = result.version_id.clone();
        info!(
            version_id = ?result.version_id,
            accuracy = ?result.accuracy(),
            "Baseline model in production"
        );
        Ok(result)
    }

    /// Check a labeled batch of new data: drift, production accuracy, retrain
    /// decision, and (if triggered) retrain plus gated promotion. The batch
    /// joins the training history either way.
    pub fn process_batch(&self, batch: &LabeledBatch) -> Result<BatchOutcome> {
        let _running = RunningGuard::new(&self.running);
        if batch.is_empty() {
            return Err(Error::Validation("cannot process an empty batch".into()));
        }
        let (version, model) = self.production_model()?;
        let combined = match &self.read_state().training_data {
            Some(history) => history.concat(batch)?,
            None => batch.clone(),
        };

        let drift = self.detector.detect_drift(batch.features(), self.config.drift.threshold)?;
        let y_pred = model.predict(&batch.features().to_rows());
        let metrics = self.evaluator.score(batch.labels(), &y_pred)?;
        self.monitor.record_performance(batch.labels(), &y_pred)?;

        let last_known_good = self
            .read_state()
            .last_known_good
            .or_else(|| version.metric("accuracy"));
        let performance_drop = match last_known_good {
            Some(lkg) if lkg > 0.0 => (lkg - metrics.accuracy) / lkg,
            _ => 0.0,
        };
        let days = self.engine.days_since_last_retrain().unwrap_or(0);
        let decision = self.engine.decide(performance_drop, drift.drift_detected, days);
        info!(
            accuracy = metrics.accuracy,
            performance_drop,
            drift = drift.drift_detected,
            days_since_retrain = days,
            retrain = decision.should_retrain(),
            "Processed batch"
        );

        let mut retrain = None;
        let mut promoted = false;
        if decision.should_retrain() {
            let model_type = &self.config.retrain.model_type;
            let result = self.engine.retrain(&combined, model_type, &decision.reason());
            let measured = MeasuredIncumbent {
                version_id: version.version_id.clone(),
                accuracy: metrics.accuracy,
            };
            promoted = self.engine.promote_if_better(&result, Some(&measured))?;
            if promoted {
                self.detector.update_baseline(combined.features())?;
                self.write_state().last_known_good = result.accuracy();
            } else if !result.is_completed() {
                warn!(error = ?result.error, "Retrain failed; production model unchanged");
            }
            retrain = Some(result);
        }
        self.write_state().training_data = Some(combined);

        Ok(BatchOutcome {
            drift,
            metrics,
            performance_drop,
            decision,
            retrain,
            promoted,
            current_version: self.store.current_id(),
        })
    }

    /// [`initialize`](Self::initialize) then, if given,
    /// [`process_batch`](Self::process_batch).
    pub fn run(
        &self,
        train: &LabeledBatch,
        new_data: Option<&LabeledBatch>,
    ) -> Result<LifecycleSummary> {
        self.initialize(train)?;
        if let Some(batch) = new_data {
            self.process_batch(batch)?;
        }
        Ok(self.summary())
    }

    /// Periodic check with no new labels: retrain on the accumulated data if
    /// the production model has gone stale.
    pub fn scheduled_check(&self) -> Result<Option<RetrainResult>> {
        let _running = RunningGuard::new(&self.running);
        let days = self.engine.days_since_last_retrain().unwrap_or(0);
        let decision = self.engine.decide(0.0, false, days);
        if !decision.should_retrain() {
            return Ok(None);
        }
        let Some(data) = self.read_state().training_data.clone() else {
            warn!("Retrain due but no training data has been seen");
            return Ok(None);
        };

        let model_type = &self.config.retrain.model_type;
        let result = self.engine.retrain(&data, model_type, &decision.reason());
        let measured = self.store.current_version().and_then(|v| {
            v.metric("accuracy").map(|accuracy| MeasuredIncumbent {
                version_id: v.version_id,
                accuracy,
            })
        });
        if self.engine.promote_if_better(&result, measured.as_ref())? {
            self.detector.update_baseline(data.features())?;
            self.write_state().last_known_good = result.accuracy();
        }
        Ok(Some(result))
    }

    /// Predict one row with the production model and log it to the monitor.
    ///
    /// Features are matched by name against the model's training columns;
    /// missing ones are treated as `NaN`.
    pub fn predict(&self, features: &BTreeMap<String, f64>) -> Result<Prediction> {
        let (version, model) = self.production_model()?;
        let started = Instant::now();

        let feature_names = version
            .metadata
            .get("feature_names")
            .and_then(|v| v.as_array());
        let row: Vec<f64> = match feature_names {
            Some(names) => names
                .iter()
                .map(|n| n.as_str().and_then(|n| features.get(n)).copied().unwrap_or(f64::NAN))
                .collect(),
            None => features.values().copied().collect(),
        };
        let probabilities = model.predict_proba(&[row]).pop().unwrap_or_default();
        let class = crate::models::argmax(&probabilities);
        let confidence = probabilities.get(class).copied().unwrap_or(0.0);
        let latency = started.elapsed().as_secs_f64();

        self.monitor.log_prediction(features, class, confidence, latency);
        Ok(Prediction {
            class,
            probabilities,
            confidence,
            version_id: version.version_id,
            latency,
        })
    }

    /// Production model, reloading the cache when `current` has moved.
    fn production_model(&self) -> Result<(ModelVersion, Arc<TrainedModel>)> {
        let version = self
            .store
            .current_version()
            .ok_or_else(|| Error::NotFound("no production version; run initialize first".into()))?;

        if let Some((id, model)) = &*self.serving.read().unwrap_or_else(PoisonError::into_inner) {
            if *id == version.version_id {
                return Ok((version, Arc::clone(model)));
            }
        }

        let (model, version) = self.store.load(Some(&version.version_id))?;
        let model = Arc::new(model);
        *self.serving.write().unwrap_or_else(PoisonError::into_inner) =
            Some((version.version_id.clone(), Arc::clone(&model)));
        Ok((version, model))
    }

    pub fn summary(&self) -> LifecycleSummary {
        LifecycleSummary {
            pipeline_status: self.phase(),
            baseline_version: self.read_state().baseline_version.clone(),
            current_version: self.store.current_id(),
            monitoring_summary: self.monitor.default_summary(),
            drift_history: self.detector.recent(SUMMARY_DRIFT_REPORTS),
        }
    }

    pub fn get_status(&self) -> PipelineStatus {
        PipelineStatus {
            is_running: self.is_running(),
            current_version: self.store.current_id(),
            total_versions: self.store.versions().len(),
            monitoring: self.monitor.default_summary(),
        }
    }

    fn phase(&self) -> PipelinePhase {
        if self.is_running() {
            PipelinePhase::Running
        } else if self.read_state().baseline_version.is_some() {
            PipelinePhase::Completed
        } else {
            PipelinePhase::Uninitialized
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Accuracy the production model is currently held to.
    pub fn last_known_good(&self) -> Option<f64> {
        self.read_state().last_known_good
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<ModelArtifactStore> {
        &self.store
    }

    pub fn detector(&self) -> &DriftDetector {
        &self.detector
    }

    pub fn engine(&self) -> &RetrainDecisionEngine {
        &self.engine
    }

    pub fn monitor(&self) -> &ModelMonitor {
        &self.monitor
    }
}
