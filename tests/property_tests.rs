//! Property-based tests for trueno-imbalance
//!
//! - Ratio parsing and linspace invariants
//! - Delta arithmetic against baselines
//! - ROC/AUC bounds
//! - Run with ProptestConfig::with_cases(100)

use proptest::prelude::*;
use trueno_imbalance::correction::ImbalanceCorrection;
use trueno_imbalance::dataset::Dataset;
use trueno_imbalance::metrics::{roc_curve, trapezoidal_auc, Metrics};
use trueno_imbalance::ratio::{linspace, parse_label, ratio_label, RatioSpec};
use trueno_imbalance::results::{ResultStore, RunOutcome};

// ============================================================================
// Property Test Generators (Strategies)
// ============================================================================

/// Generate metrics with a valid two-point ROC curve
fn arb_metrics() -> impl Strategy<Value = Metrics> {
    (0.0f64..=1.0, 0.0f64..=1.0, 0.0f64..=1.0).prop_map(|(auc, f1, score)| Metrics {
        auc,
        f1,
        fpr: vec![0.0, 1.0],
        tpr: vec![0.0, 1.0],
        score,
    })
}

/// Generate scores and labels with both classes present
fn arb_scored_labels() -> impl Strategy<Value = (Vec<f64>, Vec<usize>)> {
    (2usize..60).prop_flat_map(|n| {
        (
            proptest::collection::vec(0.0f64..=1.0, n),
            proptest::collection::vec(0usize..=1, n - 2),
        )
            .prop_map(|(scores, mut labels)| {
                labels.push(0);
                labels.push(1);
                (scores, labels)
            })
    })
}

/// Generate an imbalanced two-feature dataset (crop majority)
fn arb_imbalanced() -> impl Strategy<Value = Dataset> {
    (6usize..30, 2usize..6).prop_flat_map(|(n_crop, n_weed)| {
        proptest::collection::vec((-10.0f32..10.0, -10.0f32..10.0), n_crop + n_weed).prop_map(
            move |points| {
                let rows = points.into_iter().map(|(a, b)| vec![a, b]).collect();
                let labels = (0..n_crop + n_weed).map(|i| usize::from(i >= n_crop)).collect();
                Dataset::new(vec!["a".into(), "b".into()], rows, labels).unwrap()
            },
        )
    })
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // ========================================================================
    // Ratio Properties
    // ========================================================================

    /// Property: linspace yields exactly `steps` values with pinned endpoints
    #[test]
    fn prop_linspace_length_and_endpoints(
        start in -100.0f64..100.0,
        end in -100.0f64..100.0,
        steps in 2usize..50
    ) {
        let values = linspace(start, end, steps);
        prop_assert_eq!(values.len(), steps);
        prop_assert!((values[0] - start).abs() < f64::EPSILON);
        prop_assert!((values[steps - 1] - end).abs() < f64::EPSILON);
    }

    /// Property: linspace is evenly spaced
    #[test]
    fn prop_linspace_even_spacing(
        start in 0.0f64..50.0,
        width in 0.1f64..50.0,
        steps in 3usize..30
    ) {
        let values = linspace(start, start + width, steps);
        let gap = values[1] - values[0];
        for pair in values.windows(2) {
            prop_assert!(((pair[1] - pair[0]) - gap).abs() < 1e-9);
        }
    }

    /// Property: a single weed value parses to a one-element sweep
    #[test]
    fn prop_single_ratio(crop in 0u32..1000, weed in 0u32..1000, steps in 0usize..10) {
        let spec = RatioSpec::parse(&format!("{crop}:{weed}"), steps).unwrap();
        prop_assert_eq!(spec.weeds(), &[f64::from(weed)]);
    }

    /// Property: ratio labels parse back to their values
    #[test]
    fn prop_ratio_label_round_trip(crop in 0.0f64..1000.0, weed in 0.0f64..1000.0) {
        prop_assert_eq!(parse_label(&ratio_label(crop, weed)).unwrap(), (crop, weed));
    }

    // ========================================================================
    // Delta Properties
    // ========================================================================

    /// Property: auc-delta and f1-delta are corrected minus baseline; fpr-delta is 0
    #[test]
    fn prop_deltas_against_baseline(baseline in arb_metrics(), corrected in arb_metrics()) {
        let mut store = ResultStore::new();
        store.record_result("KNN", "NONE", "10.0:1.0", &RunOutcome::new("KNN", baseline.clone()), false).unwrap();
        store.record_result("KNN", "SMOTE", "10.0:1.0", &RunOutcome::new("KNN", corrected.clone()), true).unwrap();

        let row = &store.corrected()[0];
        prop_assert!((row.auc_delta() - (corrected.auc - baseline.auc)).abs() < 1e-12);
        prop_assert!((row.f1_delta() - (corrected.f1 - baseline.f1)).abs() < 1e-12);
        prop_assert!(row.fpr_delta().abs() < f64::EPSILON);
    }

    // ========================================================================
    // ROC Properties
    // ========================================================================

    /// Property: ROC runs from (0,0) to (1,1) monotonically and AUC lies in [0,1]
    #[test]
    fn prop_roc_monotone_and_bounded((scores, labels) in arb_scored_labels()) {
        let (fpr, tpr) = roc_curve(&scores, &labels).unwrap();
        prop_assert_eq!(fpr.len(), tpr.len());
        prop_assert_eq!((fpr[0], tpr[0]), (0.0, 0.0));
        prop_assert!((fpr[fpr.len() - 1] - 1.0).abs() < 1e-12);
        prop_assert!((tpr[tpr.len() - 1] - 1.0).abs() < 1e-12);
        for pair in fpr.windows(2) {
            prop_assert!(pair[1] >= pair[0]);
        }
        for pair in tpr.windows(2) {
            prop_assert!(pair[1] >= pair[0]);
        }
        let auc = trapezoidal_auc(&fpr, &tpr);
        prop_assert!((-1e-12..=1.0 + 1e-12).contains(&auc));
    }

    // ========================================================================
    // Correction Properties
    // ========================================================================

    /// Property: oversampling brings the minority to parity and keeps every original row
    #[test]
    fn prop_oversampling_reaches_parity(data in arb_imbalanced(), seed in 0u64..1000) {
        use rand::SeedableRng;
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        for correction in [ImbalanceCorrection::Random, ImbalanceCorrection::Smote] {
            let corrected = correction.resample(&data, &mut rng).unwrap();
            let (crop, weed) = corrected.class_counts();
            prop_assert_eq!(crop, weed);
            prop_assert!(corrected.len() >= data.len());
        }
    }

    /// Property: random undersampling trims the majority to the minority size
    #[test]
    fn prop_undersampling_reaches_parity(data in arb_imbalanced(), seed in 0u64..1000) {
        use rand::SeedableRng;
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        let corrected = ImbalanceCorrection::Undersample.resample(&data, &mut rng).unwrap();
        let (_, weed) = data.class_counts();
        prop_assert_eq!(corrected.class_counts(), (weed, weed));
    }
}
