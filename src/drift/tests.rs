//! Tests for drift statistics and detection.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use approx::assert_abs_diff_eq;
use proptest::prelude::*;

use super::*;
use crate::clock::ManualClock;
use crate::data::synthetic::normal_column;
use crate::data::FeatureBatch;
use crate::error::Error;

fn batch(columns: Vec<(&str, Vec<f64>)>) -> FeatureBatch {
    FeatureBatch::from_columns(columns).unwrap()
}

fn detector() -> DriftDetector {
    DriftDetector::new(Arc::new(ManualClock::default()))
}

#[test]
fn test_statistics_basic() {
    let outcome = calculate_statistics(&batch(vec![("x", vec![1.0, 2.0, 3.0, 4.0])]));
    let s = outcome.statistics["x"];
    assert_abs_diff_eq!(s.mean, 2.5);
    assert_abs_diff_eq!(s.std, (5.0f64 / 3.0).sqrt(), epsilon = 1e-12);
    assert_abs_diff_eq!(s.min, 1.0);
    assert_abs_diff_eq!(s.max, 4.0);
    assert_abs_diff_eq!(s.p25, 1.75);
    assert_abs_diff_eq!(s.p50, 2.5);
    assert_abs_diff_eq!(s.p75, 3.25);
    assert_abs_diff_eq!(s.null_rate, 0.0);
    assert!(outcome.skipped.is_empty());
}

#[test]
fn test_statistics_nan_counts_as_null() {
    let outcome = calculate_statistics(&batch(vec![("x", vec![1.0, f64::NAN, 3.0, f64::NAN])]));
    let s = outcome.statistics["x"];
    assert_abs_diff_eq!(s.null_rate, 0.5);
    assert_abs_diff_eq!(s.mean, 2.0);
}

#[test]
fn test_statistics_skip_infinite() {
    let outcome = calculate_statistics(&batch(vec![
        ("x", vec![1.0, f64::INFINITY, 3.0]),
        ("y", vec![f64::NAN, f64::NEG_INFINITY, f64::NAN]),
    ]));
    assert_abs_diff_eq!(outcome.statistics["x"].mean, 2.0);
    assert!(!outcome.statistics.contains_key("y"));
    assert_eq!(outcome.skipped.len(), 2);
    assert!(outcome.skipped.iter().any(|s| s.column == "y" && s.reason.contains("no finite")));
}

#[test]
fn test_single_value_has_zero_std() {
    let outcome = calculate_statistics(&batch(vec![("x", vec![7.0])]));
    assert_abs_diff_eq!(outcome.statistics["x"].std, 0.0);
    assert_abs_diff_eq!(outcome.statistics["x"].p75, 7.0);
}

#[test]
fn test_first_detection_establishes_baseline() {
    let detector = detector();
    let report = detector
        .detect_drift(&batch(vec![("x", vec![1.0, 2.0, 3.0])]), 0.1)
        .unwrap();
    assert!(!report.drift_detected);
    assert!(report.baseline_established);
    assert!(detector.has_baseline());
    assert!(detector.history().is_empty());
}

#[test]
fn test_empty_batch_is_rejected() {
    let detector = detector();
    let result = detector.detect_drift(&FeatureBatch::new(), 0.1);
    assert!(matches!(result, Err(Error::Validation(_))));
    assert!(!detector.has_baseline());
    assert!(detector.history().is_empty());
}

#[test]
fn test_batch_without_usable_columns_is_rejected() {
    let detector = detector();
    let unusable = batch(vec![("x", vec![f64::NAN, f64::INFINITY])]);
    assert!(matches!(detector.detect_drift(&unusable, 0.1), Err(Error::Validation(_))));
    assert!(matches!(detector.update_baseline(&unusable), Err(Error::Validation(_))));
    assert!(!detector.has_baseline());

    detector
        .update_baseline(&batch(vec![("x", vec![1.0, 2.0, 3.0])]))
        .unwrap();
    let before = detector.baseline();
    assert!(detector.update_baseline(&FeatureBatch::new()).is_err());
    assert!(matches!(detector.detect_drift(&unusable, 0.1), Err(Error::Validation(_))));
    assert_eq!(detector.baseline(), before);
    assert!(detector.history().is_empty());
}

#[test]
fn test_mean_shift_example() {
    // Mean 10 → 15 with unchanged std scores (0.5 + 0) / 2.
    let detector = detector();
    detector
        .update_baseline(&batch(vec![("x", vec![8.0, 10.0, 12.0])]))
        .unwrap();
    let report = detector
        .detect_drift(&batch(vec![("x", vec![13.0, 15.0, 17.0])]), 0.1)
        .unwrap();

    assert_abs_diff_eq!(report.drift_scores["x"], 0.25, epsilon = 1e-9);
    assert_abs_diff_eq!(report.max_drift_score, 0.25, epsilon = 1e-9);
    assert!(report.drift_detected);
    assert_eq!(report.severity(0.1), Severity::Critical);
    assert_eq!(detector.history().len(), 1);
}

#[test]
fn test_baseline_against_itself_has_zero_drift() {
    let detector = detector();
    let data = batch(vec![
        ("x", normal_column(500, 10.0, 2.0, 1)),
        ("y", normal_column(500, -3.0, 1.0, 2)),
    ]);
    detector.update_baseline(&data).unwrap();
    let report = detector.detect_drift(&data, 0.1).unwrap();
    assert_abs_diff_eq!(report.max_drift_score, 0.0);
    assert!(!report.drift_detected);
}

#[test]
fn test_only_shared_columns_are_scored() {
    let detector = detector();
    detector
        .update_baseline(&batch(vec![("x", vec![1.0, 2.0, 3.0])]))
        .unwrap();
    let other = batch(vec![("z", vec![100.0, 200.0, 300.0])]);
    let report = detector.detect_drift(&other, 0.1).unwrap();
    assert!(report.drift_scores.is_empty());
    assert_abs_diff_eq!(report.max_drift_score, 0.0);
    assert!(!report.drift_detected);
    assert_eq!(report.skipped[0].column, "z");
}

#[test]
fn test_zero_baseline_uses_epsilon() {
    let detector = detector();
    detector
        .update_baseline(&batch(vec![("x", vec![0.0, 0.0, 0.0])]))
        .unwrap();
    let report = detector
        .detect_drift(&batch(vec![("x", vec![0.0, 0.0, 0.0])]), 0.1)
        .unwrap();
    assert_abs_diff_eq!(report.max_drift_score, 0.0);
    let report = detector
        .detect_drift(&batch(vec![("x", vec![1.0, 1.0, 1.0])]), 0.1)
        .unwrap();
    assert!(report.max_drift_score.is_finite());
    assert!(report.drift_detected);
}

#[test]
fn test_severity_warning_band() {
    let detector = detector();
    detector
        .update_baseline(&batch(vec![("x", vec![9.0, 10.0, 11.0])]))
        .unwrap();
    // Mean 10 → 11.8: score 0.09, inside [0.08, 0.1].
    let report = detector
        .detect_drift(&batch(vec![("x", vec![10.8, 11.8, 12.8])]), 0.1)
        .unwrap();
    assert!(!report.drift_detected);
    assert_eq!(report.severity(0.1), Severity::Warning);
    assert_eq!(report.severity(0.5), Severity::None);
}

#[test]
fn test_on_drift_callback_fires_only_on_drift() {
    let fired = Arc::new(AtomicUsize::new(0));
    let mut detector = detector();
    let counter = Arc::clone(&fired);
    detector.on_drift(move |report| {
        assert!(report.drift_detected);
        counter.fetch_add(1, Ordering::SeqCst);
    });

    detector
        .update_baseline(&batch(vec![("x", vec![8.0, 10.0, 12.0])]))
        .unwrap();
    detector
        .detect_drift(&batch(vec![("x", vec![8.0, 10.0, 12.0])]), 0.1)
        .unwrap();
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    detector
        .detect_drift(&batch(vec![("x", vec![13.0, 15.0, 17.0])]), 0.1)
        .unwrap();
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[test]
fn test_recent_returns_tail() {
    let detector = detector();
    detector
        .update_baseline(&batch(vec![("x", vec![1.0, 2.0, 3.0])]))
        .unwrap();
    for shift in 0..7 {
        let s = f64::from(shift);
        detector
            .detect_drift(&batch(vec![("x", vec![1.0 + s, 2.0 + s, 3.0 + s])]), 0.1)
            .unwrap();
    }
    let recent = detector.recent(5);
    assert_eq!(recent.len(), 5);
    assert_eq!(recent.last(), detector.history().last());
    assert_eq!(detector.recent(100).len(), 7);
}

proptest! {
    #[test]
    fn prop_detection_is_idempotent(
        base in prop::collection::vec(-100.0f64..100.0, 2..40),
        new in prop::collection::vec(-100.0f64..100.0, 2..40),
    ) {
        let detector = detector();
        detector.update_baseline(&batch(vec![("x", base)])).unwrap();
        let data = batch(vec![("x", new)]);
        let first = detector.detect_drift(&data, 0.1).unwrap();
        let second = detector.detect_drift(&data, 0.1).unwrap();
        prop_assert_eq!(first.drift_scores, second.drift_scores);
        prop_assert_eq!(first.drift_detected, second.drift_detected);
        prop_assert_eq!(detector.history().len(), 2);
    }

    #[test]
    fn prop_quantiles_are_ordered(values in prop::collection::vec(-1e6f64..1e6, 1..60)) {
        let outcome = calculate_statistics(&batch(vec![("x", values)]));
        let s = outcome.statistics["x"];
        prop_assert!(s.min <= s.p25 && s.p25 <= s.p50 && s.p50 <= s.p75 && s.p75 <= s.max);
        prop_assert!(s.std >= 0.0);
    }
}
