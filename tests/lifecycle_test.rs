//! Integration tests for the retrain/promote lifecycle

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use continual::data::synthetic::SyntheticClassification;
use continual::retrain::{MeasuredIncumbent, RetrainPolicy, RetrainTrigger};
use continual::scheduler::schedule_pipeline;
use continual::store::FsBackend;
use continual::{
    ManualClock, ModelArtifactStore, PipelineConfig, PipelineOrchestrator, VersionStatus,
};

fn config() -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.retrain.model_type = "logistic_regression".into();
    config.retrain.cv_folds = 3;
    config
}

fn data(n: usize, seed: u64, shift: f64) -> SyntheticClassification {
    SyntheticClassification::new(3)
        .samples(n)
        .class_sep(3.0)
        .seed(seed)
        .shift(10.0 + shift)
}

#[test]
fn test_should_retrain_examples() {
    let policy = RetrainPolicy::from(&config().retrain);
    assert!(!policy.decide(0.02, false, 10).should_retrain());
    assert!(policy.decide(0.02, false, 45).should_retrain());
    assert!(policy.decide(0.06, false, 0).should_retrain());
    assert!(policy.decide(0.0, true, 0).should_retrain());
}

#[test]
fn test_weaker_candidate_leaves_current_unchanged() {
    let clock = Arc::new(ManualClock::default());
    let pipeline = PipelineOrchestrator::in_memory(config(), clock);
    let initial = pipeline
        .initialize(&data(300, 1, 0.0).generate())
        .expect("operation should succeed");
    let incumbent_id = initial.version_id.clone().expect("promoted");

    let noisy = data(300, 2, 0.0).label_noise(0.45).generate();
    let candidate = pipeline
        .engine()
        .retrain(&noisy, "logistic_regression", "test");
    assert!(candidate.is_completed());

    let measured = MeasuredIncumbent {
        version_id: incumbent_id.clone(),
        accuracy: initial.accuracy().expect("accuracy recorded"),
    };
    assert!(candidate.accuracy() < Some(measured.accuracy));
    let promoted = pipeline
        .engine()
        .promote_if_better(&candidate, Some(&measured))
        .expect("operation should succeed");

    assert!(!promoted);
    assert_eq!(pipeline.store().current_id(), Some(incumbent_id));
    let candidate_id = candidate.version_id.expect("saved");
    assert_eq!(pipeline.store().get(&candidate_id).map(|v| v.status), Some(VersionStatus::Staged));
}

#[test]
fn test_single_production_across_batches() {
    let clock = Arc::new(ManualClock::default());
    let pipeline = PipelineOrchestrator::in_memory(config(), clock);
    pipeline
        .initialize(&data(300, 1, 0.0).generate())
        .expect("operation should succeed");

    for (seed, shift) in [(2, 0.0), (3, 3.0), (4, 6.0), (5, 0.5)] {
        pipeline
            .process_batch(&data(100, seed, shift).generate())
            .expect("operation should succeed");

        let ledger = pipeline.store().ledger();
        let production: Vec<_> = ledger
            .versions
            .iter()
            .filter(|v| v.status == VersionStatus::Production)
            .collect();
        assert_eq!(production.len(), 1);
        assert_eq!(ledger.current.as_deref(), Some(production[0].version_id.as_str()));
    }
}

#[test]
fn test_histories_only_grow() {
    let clock = Arc::new(ManualClock::default());
    let pipeline = PipelineOrchestrator::in_memory(config(), clock);
    pipeline
        .initialize(&data(300, 1, 0.0).generate())
        .expect("operation should succeed");

    let mut drift_len = pipeline.detector().history().len();
    let mut log_len = pipeline.monitor().prediction_count();
    for seed in 10..14 {
        let row = BTreeMap::from([
            ("f0".to_string(), 11.0),
            ("f1".to_string(), 9.0),
            ("f2".to_string(), 11.0),
        ]);
        pipeline.predict(&row).expect("operation should succeed");
        pipeline
            .process_batch(&data(60, seed, 0.0).generate())
            .expect("operation should succeed");

        let drift_now = pipeline.detector().history().len();
        let log_now = pipeline.monitor().prediction_count();
        assert!(drift_now > drift_len);
        assert!(log_now > log_len);
        drift_len = drift_now;
        log_len = log_now;
    }
}

#[test]
fn test_scheduler_drives_pipeline_checks() {
    let clock = Arc::new(ManualClock::default());
    let pipeline = Arc::new(PipelineOrchestrator::in_memory(config(), clock.clone()));
    pipeline
        .initialize(&data(200, 1, 0.0).generate())
        .expect("operation should succeed");
    clock.advance(chrono::Duration::days(31));

    let scheduler = schedule_pipeline(Arc::clone(&pipeline), Duration::from_secs(3600));
    assert!(scheduler.trigger_now());
    assert_eq!(scheduler.runs(), 1);
    scheduler.stop();

    let history = pipeline.engine().history();
    assert_eq!(history.len(), 2);
    assert!(history[1].is_completed());
}

fn reopen(dir: &std::path::Path, clock: &Arc<ManualClock>) -> PipelineOrchestrator {
    let backend = FsBackend::open(dir).expect("operation should succeed");
    let store = ModelArtifactStore::with_backend(backend, clock.clone())
        .expect("operation should succeed");
    PipelineOrchestrator::with_store(config(), Arc::new(store), clock.clone())
}

#[test]
fn test_staleness_survives_restart() {
    let dir = tempfile::tempdir().expect("temp dir");
    let clock = Arc::new(ManualClock::default());
    {
        let pipeline = reopen(dir.path(), &clock);
        pipeline
            .initialize(&data(300, 1, 0.0).generate())
            .expect("operation should succeed");
    }

    clock.advance(chrono::Duration::days(45));
    let pipeline = reopen(dir.path(), &clock);
    assert_eq!(pipeline.engine().days_since_last_retrain(), Some(45));

    let outcome = pipeline
        .process_batch(&data(200, 2, 0.0).generate())
        .expect("operation should succeed");
    assert!(outcome
        .decision
        .triggers
        .iter()
        .any(|t| matches!(t, RetrainTrigger::Staleness { days: 45, .. })));
    assert!(outcome.retrain.is_some());
    assert_eq!(pipeline.engine().days_since_last_retrain(), Some(0));

    clock.advance(chrono::Duration::days(31));
    let scheduled = pipeline
        .scheduled_check()
        .expect("operation should succeed");
    assert!(scheduled.is_some());
}
