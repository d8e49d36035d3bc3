//! Integration tests for the on-disk artifact store

use continual::models::{Classifier, LogisticRegression};
use continual::store::{Metadata, Metrics, ModelArtifactStore, VersionLedger, LEDGER_FILE};
use continual::{TrainedModel, VersionStatus};

fn model() -> TrainedModel {
    let mut model = LogisticRegression::new(20, 0.5);
    model
        .fit(&[vec![0.0], vec![1.0], vec![2.0], vec![3.0]], &[0, 0, 1, 1])
        .expect("operation should succeed");
    TrainedModel::LogisticRegression(model)
}

fn save_and_promote(store: &ModelArtifactStore, accuracy: f64) -> String {
    let metrics = Metrics::from([("accuracy".to_string(), accuracy)]);
    let id = store
        .save(&model(), metrics, Metadata::new())
        .expect("operation should succeed");
    assert!(store.promote(&id).expect("operation should succeed"));
    id
}

fn assert_single_production(ledger: &VersionLedger) {
    let production: Vec<_> = ledger
        .versions
        .iter()
        .filter(|v| v.status == VersionStatus::Production)
        .collect();
    assert!(production.len() <= 1);
    assert_eq!(ledger.current, production.first().map(|v| v.version_id.clone()));
}

#[test]
fn test_current_pointer_survives_restart() {
    let dir = tempfile::tempdir().expect("temp dir");
    let (v1, v2) = {
        let store = ModelArtifactStore::open(dir.path()).expect("operation should succeed");
        let v1 = save_and_promote(&store, 0.8);
        let v2 = save_and_promote(&store, 0.85);
        (v1, v2)
    };

    assert!(dir.path().join(LEDGER_FILE).exists());
    assert!(dir.path().join(format!("model_{v1}.bin")).exists());

    let reopened = ModelArtifactStore::open(dir.path()).expect("operation should succeed");
    assert_eq!(reopened.current_id(), Some(v2.clone()));
    assert_eq!(reopened.get(&v1).map(|v| v.status), Some(VersionStatus::Archived));
    assert_single_production(&reopened.ledger());

    let (loaded, version) = reopened.load(None).expect("operation should succeed");
    assert_eq!(version.version_id, v2);
    let rows = [vec![0.5], vec![2.5]];
    assert_eq!(loaded.predict_proba(&rows), model().predict_proba(&rows));
}

#[test]
fn test_rollback_walks_production_history() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = ModelArtifactStore::open(dir.path()).expect("operation should succeed");
    let ids: Vec<String> = [0.8, 0.82, 0.84]
        .iter()
        .map(|&a| save_and_promote(&store, a))
        .collect();

    let before = store.ledger();
    assert!(!store.rollback(3).expect("operation should succeed"));
    assert_eq!(store.ledger(), before);

    assert!(store.rollback(1).expect("operation should succeed"));
    assert_eq!(store.current_id(), Some(ids[1].clone()));
    assert_single_production(&store.ledger());

    let reopened = ModelArtifactStore::open(dir.path()).expect("operation should succeed");
    assert_eq!(reopened.current_id(), Some(ids[1].clone()));
}

#[test]
fn test_unknown_version_is_not_promoted() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = ModelArtifactStore::open(dir.path()).expect("operation should succeed");
    let id = save_and_promote(&store, 0.9);

    assert!(!store.promote("v_does_not_exist").expect("operation should succeed"));
    assert_eq!(store.current_id(), Some(id));
    assert!(store.load(Some("v_does_not_exist")).is_err());
}

#[test]
fn test_versions_json_is_audit_readable() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = ModelArtifactStore::open(dir.path()).expect("operation should succeed");
    let id = save_and_promote(&store, 0.9);

    let raw = store.versions_json().expect("operation should succeed");
    let json: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
    assert_eq!(json["current"], serde_json::json!(id));
    assert_eq!(json["versions"][0]["status"], "production");
    assert_eq!(json["versions"][0]["metrics"]["accuracy"], 0.9);
}
