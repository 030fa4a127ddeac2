//! Sweep ordering tests
//!
//! A recording runner stands in for model fitting so the two-phase order
//! can be checked directly.

use trueno_imbalance::classifier::ClassificationTechnique;
use trueno_imbalance::correction::ImbalanceCorrection;
use trueno_imbalance::metrics::Metrics;
use trueno_imbalance::ratio::RatioSpec;
use trueno_imbalance::results::{ResultStore, RunOutcome};
use trueno_imbalance::sweep::{ExperimentRunner, ParameterSweeper, RunRequest, SweepPlan};
use trueno_imbalance::{Error, Result};

/// Records every request; AUC rises with the weed share so deltas are
/// predictable, and corrected runs score 0.1 higher.
#[derive(Debug, Default)]
struct RecordingRunner {
    requests: Vec<RunRequest>,
    fail_on: Option<usize>,
}

impl ExperimentRunner for RecordingRunner {
    fn run(&mut self, request: &RunRequest) -> Result<RunOutcome> {
        if self.fail_on == Some(self.requests.len()) {
            return Err(Error::Training("injected failure".into()));
        }
        self.requests.push(*request);
        let bonus = if request.corrected { 0.1 } else { 0.0 };
        let auc = 0.5 + request.ratio.1 / 100.0 + bonus;
        Ok(RunOutcome::new(
            request.classification.display_name(),
            Metrics {
                auc,
                f1: auc / 2.0,
                fpr: vec![0.0, 1.0],
                tpr: vec![0.0, 1.0],
                score: auc,
            },
        ))
    }
}

fn sweep(classifier: &str, algorithm: &str, ratio: &str) -> (RecordingRunner, ResultStore) {
    let plan = SweepPlan::from_choices(classifier, algorithm, RatioSpec::parse(ratio, 5).unwrap())
        .unwrap();
    let mut runner = RecordingRunner::default();
    let mut store = ResultStore::new();
    ParameterSweeper::new(plan).run(&mut runner, &mut store).unwrap();
    (runner, store)
}

// ============================================================================
// Phase ordering
// ============================================================================

#[test]
fn test_every_baseline_before_any_corrected_run() {
    let (runner, _) = sweep("ALL", "ALL-OVER", "10:1-10");
    let first_corrected = runner
        .requests
        .iter()
        .position(|r| r.corrected)
        .unwrap();
    assert_eq!(first_corrected, 8 * 5);
    assert!(runner.requests[first_corrected..].iter().all(|r| r.corrected));
    assert!(runner.requests[..first_corrected]
        .iter()
        .all(|r| r.correction.is_none()));
}

#[test]
fn test_all_classifiers_all_oversampling_counts() {
    let (runner, store) = sweep("ALL", "ALL-OVER", "10:1-10");
    assert_eq!(runner.requests.len(), 8 * 5 + 8 * 4 * 5);
    assert_eq!(store.uncorrected().len(), 8 * 5);
    assert_eq!(store.corrected().len(), 8 * 4 * 5);
    assert_eq!(store.roc_series().len(), 8);
}

#[test]
fn test_corrected_nesting_order() {
    let (runner, _) = sweep("knn", "ALL-COMBINED", "10:1-2");
    let corrected: Vec<(Option<ImbalanceCorrection>, f64)> = runner
        .requests
        .iter()
        .filter(|r| r.corrected)
        .map(|r| (r.correction, r.ratio.1))
        .collect();
    assert_eq!(
        corrected,
        vec![
            (Some(ImbalanceCorrection::SmoteEnn), 1.0),
            (Some(ImbalanceCorrection::SmoteEnn), 1.25),
            (Some(ImbalanceCorrection::SmoteEnn), 1.5),
            (Some(ImbalanceCorrection::SmoteEnn), 1.75),
            (Some(ImbalanceCorrection::SmoteEnn), 2.0),
            (Some(ImbalanceCorrection::SmoteTomek), 1.0),
            (Some(ImbalanceCorrection::SmoteTomek), 1.25),
            (Some(ImbalanceCorrection::SmoteTomek), 1.5),
            (Some(ImbalanceCorrection::SmoteTomek), 1.75),
            (Some(ImbalanceCorrection::SmoteTomek), 2.0),
        ]
    );
}

#[test]
fn test_single_classifier_single_ratio() {
    let (runner, store) = sweep("lda", "smote", "10:2");
    assert_eq!(runner.requests.len(), 2);
    assert_eq!(
        runner.requests[0].classification,
        ClassificationTechnique::Lda
    );
    assert_eq!(store.corrected()[0].classification(), "LDA");
    assert_eq!(store.corrected()[0].ratio(), "10.0:2.0");
    assert_eq!(store.corrected()[0].correction(), "SMOTE");
}

// ============================================================================
// Deltas through the sweep
// ============================================================================

#[test]
fn test_sweep_deltas_match_baseline() {
    let (_, store) = sweep("ALL", "smote", "10:1-10");
    for row in store.corrected() {
        let baseline = store.baseline(row.classification(), row.ratio()).unwrap();
        assert!((row.auc_delta() - (row.auc() - baseline.auc())).abs() < 1e-12);
        assert!((row.auc_delta() - 0.1).abs() < 1e-9);
        assert!(row.fpr_delta().abs() < f64::EPSILON);
    }
}

#[test]
fn test_none_runs_corrected_phase_without_correction() {
    let (runner, store) = sweep("knn", "NONE", "4:1");
    let corrected: Vec<&RunRequest> = runner.requests.iter().filter(|r| r.corrected).collect();
    assert_eq!(corrected.len(), 1);
    assert!(corrected[0].correction.is_none());
    assert_eq!(store.corrected()[0].correction(), "NONE");
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_run_failure_stops_sweep() {
    let plan = SweepPlan::from_choices("knn", "smote", RatioSpec::parse("10:1-10", 5).unwrap())
        .unwrap();
    let mut runner = RecordingRunner {
        fail_on: Some(2),
        ..RecordingRunner::default()
    };
    let mut store = ResultStore::new();
    let err = ParameterSweeper::new(plan)
        .run(&mut runner, &mut store)
        .unwrap_err();
    assert!(matches!(err, Error::Training(_)));
    assert_eq!(runner.requests.len(), 2);
    assert!(store.corrected().is_empty());
}

#[test]
fn test_unknown_choices_rejected_before_running() {
    let ratio = RatioSpec::parse("10:1", 5).unwrap();
    assert!(matches!(
        SweepPlan::from_choices("bayes", "smote", ratio.clone()),
        Err(Error::UnknownClassifier(_))
    ));
    assert!(matches!(
        SweepPlan::from_choices("knn", "ALL-UNDER", ratio),
        Err(Error::UnknownCorrection(_))
    ));
}

#[test]
fn test_sweeper_keeps_its_plan() {
    let plan = SweepPlan::from_choices("ALL", "NONE", RatioSpec::parse("10:1-4", 4).unwrap())
        .unwrap();
    let sweeper = ParameterSweeper::new(plan.clone());
    assert_eq!(sweeper.plan(), &plan);
    assert_eq!(sweeper.plan().baseline_runs(), 8 * 4);
    assert_eq!(sweeper.plan().corrected_runs(), 8 * 4);
}
