//! Retrain decision engine: decide, train, gate.

use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{info, warn};

use super::gate::{MeasuredIncumbent, PromotionGate};
use super::lifecycle::{RetrainLifecycle, RetrainState};
use super::policy::{RetrainDecision, RetrainPolicy};
use super::result::{RetrainResult, RetrainStatus};
use crate::clock::Clock;
use crate::config::RetrainConfig;
use crate::data::LabeledBatch;
use crate::error::{Error, Result};
use crate::eval::{train_test_split, KFold, ModelEvaluator};
use crate::models::{Classifier, ModelFamily};
use crate::store::{Metadata, ModelArtifactStore, PromotionOutcome};

/// Decides when to retrain, trains candidates, and gates their promotion.
pub struct RetrainDecisionEngine {
    policy: RetrainPolicy,
    gate: PromotionGate,
    config: RetrainConfig,
    store: Arc<ModelArtifactStore>,
    evaluator: ModelEvaluator,
    clock: Arc<dyn Clock>,
    lifecycle: Mutex<RetrainLifecycle>,
    history: RwLock<Vec<RetrainResult>>,
    last_retrain: RwLock<Option<DateTime<Utc>>>,
}

impl std::fmt::Debug for RetrainDecisionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrainDecisionEngine")
            .field("policy", &self.policy)
            .field("gate", &self.gate)
            .field("state", &self.state())
            .finish()
    }
}

impl RetrainDecisionEngine {
    pub fn new(
        config: &RetrainConfig,
        store: Arc<ModelArtifactStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            policy: RetrainPolicy::from(config),
            gate: PromotionGate::new(config.min_improvement),
            config: config.clone(),
            store,
            evaluator: ModelEvaluator::new(),
            clock,
            lifecycle: Mutex::new(RetrainLifecycle::default()),
            history: RwLock::new(Vec::new()),
            last_retrain: RwLock::new(None),
        }
    }

    /// `drop > threshold || drift || days > max_days`.
    pub fn should_retrain(
        &self,
        performance_drop: f64,
        drift_detected: bool,
        days_since_retrain: i64,
    ) -> bool {
        self.decide(performance_drop, drift_detected, days_since_retrain).should_retrain()
    }

    /// Like [`should_retrain`](Self::should_retrain), listing which triggers fired.
    pub fn decide(
        &self,
        performance_drop: f64,
        drift_detected: bool,
        days_since_retrain: i64,
    ) -> RetrainDecision {
        self.policy.decide(performance_drop, drift_detected, days_since_retrain)
    }

    fn advance(&self, to: RetrainState) {
        let mut lifecycle = self.lifecycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = lifecycle.advance(to, self.clock.now()) {
            warn!(error = %e, "Ignoring lifecycle transition");
        }
    }

    /// Train a `model_type` candidate on `data` and save it as staged.
    ///
    /// Never fails: training errors produce a `failed` result. Either way the
    /// result is appended to the history.
    pub fn retrain(&self, data: &LabeledBatch, model_type: &str, reason: &str) -> RetrainResult {
        self.advance(RetrainState::Retraining);
        let family = ModelFamily::try_parse(model_type).unwrap_or_else(|| {
            warn!(model_type, fallback = %ModelFamily::DefaultEnsemble, "Unknown model type");
            ModelFamily::DefaultEnsemble
        });

        let started = Instant::now();
        let mut metadata = Metadata::new();
        metadata.insert("model_type".into(), json!(family.as_str()));
        metadata.insert("retrain_reason".into(), json!(reason));
        metadata.insert("training_samples".into(), json!(data.len()));
        metadata.insert("feature_count".into(), json!(data.features().n_columns()));
        metadata.insert("feature_names".into(), json!(data.features().column_names()));
        if family.as_str() != model_type {
            metadata.insert("requested_model_type".into(), json!(model_type));
        }

        let result = match self.train_and_save(data, family, metadata.clone(), started) {
            Ok(result) => {
                self.mark_retrained(result.timestamp);
                self.advance(RetrainState::Evaluated);
                info!(
                    version_id = ?result.version_id,
                    accuracy = ?result.accuracy(),
                    model_type = family.as_str(),
                    "Retrain completed"
                );
                result
            }
            Err(e) => {
                self.advance(RetrainState::Failed);
                warn!(error = %e, model_type = family.as_str(), "Retrain failed");
                RetrainResult::failed(e.to_string(), metadata, self.clock.now())
            }
        };
        self.history
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(result.clone());
        result
    }

    fn train_and_save(
        &self,
        data: &LabeledBatch,
        family: ModelFamily,
        mut metadata: Metadata,
        started: Instant,
    ) -> Result<RetrainResult> {
        if data.is_empty() {
            return Err(Error::Retrain("no training data".into()));
        }
        let split = train_test_split(data.labels(), self.config.test_fraction, self.config.seed)?;
        let train = data.select(&split.train);
        let test = data.select(&split.test);

        let mut model = family.build(self.config.seed);
        model.fit(&train.features().to_rows(), train.labels())?;
        let mut metrics = self.evaluator.evaluate_batch(&model, &test)?.to_metrics();

        let kfold = KFold::new(self.config.cv_folds).with_seed(self.config.seed);
        let x_all = data.features().to_rows();
        match self
            .evaluator
            .cross_validate(family, self.config.seed, &x_all, data.labels(), &kfold)
        {
            Ok(cv) => {
                metrics.insert("cv_mean".into(), cv.mean);
                metrics.insert("cv_std".into(), cv.std);
            }
            Err(e) => warn!(error = %e, "Skipping cross-validation"),
        }

        metadata.insert("training_time".into(), json!(started.elapsed().as_secs_f64()));
        let version_id = self.store.save(&model, metrics.clone(), metadata.clone())?;
        Ok(RetrainResult {
            version_id: Some(version_id),
            metrics,
            metadata,
            status: RetrainStatus::Completed,
            error: None,
            timestamp: self.clock.now(),
        })
    }

    /// Promote a completed candidate if it beats the production model.
    ///
    /// The gate is re-checked against production at promotion time: if
    /// production moved since `measured` was taken, the new production
    /// version's recorded accuracy is the bar.
    pub fn promote_if_better(
        &self,
        result: &RetrainResult,
        measured: Option<&MeasuredIncumbent>,
    ) -> Result<bool> {
        let (Some(version_id), Some(candidate)) =
            (result.version_id.as_deref(), result.accuracy())
        else {
            return Ok(false);
        };

        let gate = self.gate;
        let mut bar_seen = None;
        let outcome = self.store.promote_if(version_id, |production| {
            bar_seen = PromotionGate::bar(production, measured);
            gate.passes(candidate, bar_seen)
        })?;

        let promoted = outcome == PromotionOutcome::Promoted;
        if promoted {
            self.advance(RetrainState::Promoted);
            info!(version_id, candidate, incumbent = ?bar_seen, "Candidate promoted");
        } else {
            self.advance(RetrainState::Rejected);
            info!(version_id, candidate, incumbent = ?bar_seen, "Candidate rejected");
        }
        Ok(promoted)
    }

    /// Promote a completed candidate without comparing it to production.
    pub fn promote(&self, result: &RetrainResult) -> Result<bool> {
        let Some(version_id) = result.version_id.as_deref() else {
            return Ok(false);
        };
        let promoted = self.store.promote(version_id)?;
        self.advance(if promoted { RetrainState::Promoted } else { RetrainState::Rejected });
        Ok(promoted)
    }

    /// Whole days since the last completed retrain.
    ///
    /// Before this engine has trained anything, the production version's
    /// creation time stands in, so a reopened store still ages. `None` when
    /// there is neither.
    pub fn days_since_last_retrain(&self) -> Option<i64> {
        let last = *self.last_retrain.read().unwrap_or_else(PoisonError::into_inner);
        let at = last.or_else(|| self.store.current_version().map(|v| v.created_at))?;
        Some((self.clock.now() - at).num_days())
    }

    /// Record an out-of-band training time (the initial model).
    pub fn mark_retrained(&self, at: DateTime<Utc>) {
        *self.last_retrain.write().unwrap_or_else(PoisonError::into_inner) = Some(at);
    }

    pub fn state(&self) -> RetrainState {
        self.lifecycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .state()
    }

    /// Every retrain attempt, oldest first.
    pub fn history(&self) -> Vec<RetrainResult> {
        self.history
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn policy(&self) -> &RetrainPolicy {
        &self.policy
    }

    pub fn config(&self) -> &RetrainConfig {
        &self.config
    }
}
