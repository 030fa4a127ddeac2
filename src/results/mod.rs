//! Sweep results: baseline and corrected rows, ROC curves, export
//!
//! ## Schema Overview
//!
//! ```text
//! BaselineRecord  (classification, ratio)       uncorrected run
//!       │
//!       └──< ResultRecord (+ correction)         deltas against the baseline
//!
//! RocSeries (display name)                       last curve per classifier
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use trueno_imbalance::metrics::Metrics;
//! use trueno_imbalance::results::{ResultStore, RunOutcome};
//!
//! let metrics = Metrics { auc: 0.75, f1: 0.5, fpr: vec![0.0, 1.0], tpr: vec![0.0, 1.0], score: 0.8 };
//! let mut store = ResultStore::new();
//! store.record_result("KNN", "NONE", "10.0:1.0", &RunOutcome::new("K-Nearest Neighbours", metrics.clone()), false)?;
//!
//! let better = Metrics { auc: 0.875, ..metrics };
//! store.record_result("KNN", "SMOTE", "10.0:1.0", &RunOutcome::new("K-Nearest Neighbours", better), true)?;
//!
//! assert!((store.corrected()[0].auc_delta() - 0.125).abs() < 1e-12);
//! # Ok::<(), trueno_imbalance::Error>(())
//! ```

mod record;
mod roc;
mod store;

pub use record::{format_rates, BaselineRecord, ResultRecord};
pub use roc::{LegendPosition, RocPlot, RocSeries, TITLE};
pub use store::{baseline_key, ResultStore};

use crate::metrics::Metrics;

/// What one classifier run reports back to the sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    /// Classifier display name (ROC series key)
    pub name: String,
    /// Metrics on the test rows
    pub metrics: Metrics,
}

impl RunOutcome {
    /// Pair a display name with its metrics.
    #[must_use]
    pub fn new(name: impl Into<String>, metrics: Metrics) -> Self {
        Self {
            name: name.into(),
            metrics,
        }
    }
}
