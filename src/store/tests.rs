//! Tests for the artifact store and ledger.

use std::sync::Arc;

use chrono::Duration;
use proptest::prelude::*;

use super::*;
use crate::clock::{Clock, ManualClock};
use crate::error::Error;
use crate::models::{Classifier, LogisticRegression, TrainedModel};

fn tiny_model() -> TrainedModel {
    let mut model = LogisticRegression::new(20, 0.5);
    model
        .fit(&[vec![0.0], vec![1.0], vec![2.0], vec![3.0]], &[0, 0, 1, 1])
        .unwrap();
    TrainedModel::LogisticRegression(model)
}

fn metrics(accuracy: f64) -> Metrics {
    Metrics::from([("accuracy".to_string(), accuracy)])
}

fn store_with_clock() -> (ModelArtifactStore, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::default());
    let store = ModelArtifactStore::in_memory(clock.clone());
    (store, clock)
}

/// Save and promote `n` versions one minute apart.
fn promote_sequence(store: &ModelArtifactStore, clock: &ManualClock, n: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            clock.advance(Duration::minutes(1));
            let id = store
                .save(&tiny_model(), metrics(0.8 + i as f64 * 0.01), Metadata::new())
                .unwrap();
            assert!(store.promote(&id).unwrap());
            id
        })
        .collect()
}

#[test]
fn test_save_creates_staged_version() {
    let (store, clock) = store_with_clock();
    clock.set(chrono::DateTime::parse_from_rfc3339("2024-03-05T10:20:30Z").unwrap().into());

    let id = store
        .save(&tiny_model(), metrics(0.9), Metadata::new())
        .unwrap();
    assert!(id.starts_with("v_20240305_102030_"));
    assert_eq!(id.len(), "v_20240305_102030_".len() + 8);

    let version = store.get(&id).unwrap();
    assert_eq!(version.status, VersionStatus::Staged);
    assert_eq!(version.promoted_at, None);
    assert_eq!(version.artifact, format!("model_{id}.bin"));
    assert_eq!(store.current_id(), None);
}

#[test]
fn test_load_without_production_is_not_found() {
    let (store, _) = store_with_clock();
    assert!(matches!(store.load(None), Err(Error::NotFound(_))));
    assert!(matches!(store.load(Some("v_missing")), Err(Error::NotFound(_))));
}

#[test]
fn test_load_round_trips_model() {
    let (store, _) = store_with_clock();
    let model = tiny_model();
    let id = store.save(&model, metrics(0.9), Metadata::new()).unwrap();
    store.promote(&id).unwrap();

    let (loaded, version) = store.load(None).unwrap();
    assert_eq!(version.version_id, id);
    let rows = [vec![0.5], vec![2.5]];
    assert_eq!(loaded.predict_proba(&rows), model.predict_proba(&rows));
}

#[test]
fn test_promote_archives_previous() {
    let (store, clock) = store_with_clock();
    let ids = promote_sequence(&store, &clock, 2);

    assert_eq!(store.current_id().as_deref(), Some(ids[1].as_str()));
    assert_eq!(store.get(&ids[0]).unwrap().status, VersionStatus::Archived);
    assert_eq!(store.get(&ids[1]).unwrap().status, VersionStatus::Production);

    let transitions = store.transitions();
    assert_eq!(transitions.len(), 3);
    assert_eq!(transitions[1].version_id, ids[0]);
    assert_eq!(transitions[1].to, VersionStatus::Archived);
}

#[test]
fn test_promote_unknown_returns_false() {
    let (store, _) = store_with_clock();
    assert!(!store.promote("v_nope").unwrap());
    assert!(store.transitions().is_empty());
}

#[test]
fn test_promote_if_gate_sees_incumbent() {
    let (store, clock) = store_with_clock();
    let ids = promote_sequence(&store, &clock, 1);
    let candidate = store
        .save(&tiny_model(), metrics(0.5), Metadata::new())
        .unwrap();

    let outcome = store
        .promote_if(&candidate, |incumbent| {
            assert_eq!(incumbent.map(|v| v.version_id.as_str()), Some(ids[0].as_str()));
            false
        })
        .unwrap();
    assert_eq!(outcome, PromotionOutcome::Rejected);
    assert_eq!(store.current_id().as_deref(), Some(ids[0].as_str()));
    assert_eq!(store.promote_if("v_nope", |_| true).unwrap(), PromotionOutcome::UnknownVersion);
}

#[test]
fn test_rollback_one_step() {
    let (store, clock) = store_with_clock();
    let ids = promote_sequence(&store, &clock, 3);

    clock.advance(Duration::minutes(1));
    assert!(store.rollback(1).unwrap());
    assert_eq!(store.current_id().as_deref(), Some(ids[1].as_str()));
    assert_eq!(store.get(&ids[2]).unwrap().status, VersionStatus::Archived);
    assert!(store.ledger().check().is_ok());
}

#[test]
fn test_rollback_with_identical_timestamps_uses_ledger_order() {
    let (store, _) = store_with_clock();
    let ids: Vec<String> = (0..3)
        .map(|_| {
            let id = store
                .save(&tiny_model(), metrics(0.9), Metadata::new())
                .unwrap();
            assert!(store.promote(&id).unwrap());
            id
        })
        .collect();

    let ledger = store.ledger();
    let target = |steps| ledger.rollback_target(steps).map(|v| v.version_id.clone());
    assert_eq!(target(0), Some(ids[2].clone()));
    assert_eq!(target(1), Some(ids[1].clone()));
    assert_eq!(target(2), Some(ids[0].clone()));

    assert!(store.rollback(1).unwrap());
    assert_eq!(store.current_id().as_deref(), Some(ids[1].as_str()));
}

#[test]
fn test_rollback_beyond_history_is_noop() {
    let (store, clock) = store_with_clock();
    let ids = promote_sequence(&store, &clock, 3);
    let before = store.ledger();

    assert!(!store.rollback(3).unwrap());
    assert_eq!(store.ledger(), before);
    assert_eq!(store.current_id().as_deref(), Some(ids[2].as_str()));
}

#[test]
fn test_failed_write_leaves_state_unchanged() {
    let clock: Arc<dyn Clock> = Arc::new(ManualClock::default());
    let backend = Arc::new(InMemoryBackend::new());
    let store = ModelArtifactStore::with_backend(Arc::clone(&backend), clock).unwrap();
    let id = store
        .save(&tiny_model(), metrics(0.9), Metadata::new())
        .unwrap();

    backend.set_fail_writes(true);
    let before = store.ledger();
    assert!(matches!(store.promote(&id), Err(Error::Storage { .. })));
    assert!(store.save(&tiny_model(), metrics(0.9), Metadata::new()).is_err());
    assert_eq!(store.ledger(), before);

    backend.set_fail_writes(false);
    assert!(store.promote(&id).unwrap());
}

#[test]
fn test_ledger_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let id = {
        let store = ModelArtifactStore::open(dir.path()).unwrap();
        let id = store
            .save(&tiny_model(), metrics(0.9), Metadata::new())
            .unwrap();
        store.promote(&id).unwrap();
        id
    };
    assert!(dir.path().join(LEDGER_FILE).exists());
    assert!(dir.path().join(format!("model_{id}.bin")).exists());

    let reopened = ModelArtifactStore::open(dir.path()).unwrap();
    assert_eq!(reopened.current_id().as_deref(), Some(id.as_str()));
    let (model, _) = reopened.load(None).unwrap();
    assert_eq!(model, tiny_model());
}

#[test]
fn test_ledger_without_transitions_loads() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(LEDGER_FILE), r#"{"versions": [], "current": null}"#).unwrap();
    let store = ModelArtifactStore::open(dir.path()).unwrap();
    assert!(store.versions().is_empty());
    assert!(store.transitions().is_empty());
}

#[test]
fn test_corrupt_ledger_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let ghost = r#"{"versions": [], "current": "v_ghost"}"#;
    std::fs::write(dir.path().join(LEDGER_FILE), ghost).unwrap();
    assert!(matches!(ModelArtifactStore::open(dir.path()), Err(Error::Storage { .. })));
}

#[test]
fn test_versions_json_lists_ledger() {
    let (store, clock) = store_with_clock();
    let ids = promote_sequence(&store, &clock, 2);
    let json: serde_json::Value = serde_json::from_str(&store.versions_json().unwrap()).unwrap();
    assert_eq!(json["current"], ids[1].as_str());
    assert_eq!(json["versions"].as_array().unwrap().len(), 2);
    assert_eq!(json["versions"][0]["status"], "archived");
}

#[derive(Debug, Clone)]
enum Op {
    Save,
    Promote(usize),
    Rollback(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Save),
        (0usize..8).prop_map(Op::Promote),
        (0usize..4).prop_map(Op::Rollback),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_single_production_invariant(ops in prop::collection::vec(op_strategy(), 1..24)) {
        let (store, clock) = store_with_clock();
        let model = tiny_model();
        let mut ids: Vec<String> = Vec::new();
        for op in ops {
            clock.advance(Duration::seconds(1));
            match op {
                Op::Save => ids.push(store.save(&model, metrics(0.9), Metadata::new()).unwrap()),
                Op::Promote(i) => {
                    if let Some(id) = ids.get(i) {
                        prop_assert!(store.promote(id).unwrap());
                    }
                }
                Op::Rollback(steps) => {
                    store.rollback(steps).unwrap();
                }
            }
            let ledger = store.ledger();
            prop_assert!(ledger.check().is_ok());
            let production = ledger.versions.iter().filter(|v| v.is_production()).count();
            prop_assert!(production <= 1);
        }
    }
}
