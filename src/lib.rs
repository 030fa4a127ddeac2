//! # Trueno-Imbalance: Class-Imbalance Correction Experiments
//!
//! **Version**: 0.1.0
//!
//! Trueno-Imbalance measures how imbalance correction changes classifier
//! quality. It trains classifiers across a sweep of crop:weed class ratios,
//! first without correction to establish baselines and then with each
//! selected correction technique, and records AUC, F1, accuracy and ROC
//! curves alongside the change against the baseline.
//!
//! ## Pipeline
//!
//! ```text
//! RatioSpec ──> ParameterSweeper ──> ExperimentRunner (load, correct, train, assess)
//!                     │
//!                     └──> ResultStore ──> corrected CSV, uncorrected CSV, ROC SVG
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use trueno_imbalance::dataset::Dataset;
//! use trueno_imbalance::ratio::RatioSpec;
//! use trueno_imbalance::results::ResultStore;
//! use trueno_imbalance::sweep::{DatasetRunner, ParameterSweeper, SweepPlan};
//!
//! let data = Dataset::load("data/blobs.csv", "type")?;
//! let selections = vec!["hue".to_string(), "saturation".to_string()];
//! let plan = SweepPlan::from_choices("ALL", "ALL-OVER", RatioSpec::parse("10:1-10", 5)?)?;
//!
//! let mut runner = DatasetRunner::new(data, selections).with_output_directory("out");
//! let mut store = ResultStore::new();
//! ParameterSweeper::new(plan).run(&mut runner, &mut store)?;
//!
//! store.export_tables("out/imbalance.csv", "out/uncorrected-imbalance.csv")?;
//! store.render_roc_plot("out/roc.svg")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod classifier;
pub mod correction;
pub mod dataset;
pub mod error;
pub mod linalg;
pub mod manifest;
pub mod metrics;
pub mod options;
pub mod ratio;
pub mod results;
pub mod sweep;

pub use error::{Error, Result};
