//! Parameter sweep over classifier × correction × ratio
//!
//! A sweep runs in two phases. Every `(classifier, ratio)` pair is first
//! run without correction to establish its baseline; only then does the
//! corrected phase run every `(classifier, correction, ratio)` triple, so
//! each corrected row finds its baseline.
//!
//! ```rust
//! use trueno_imbalance::ratio::RatioSpec;
//! use trueno_imbalance::sweep::SweepPlan;
//!
//! let plan = SweepPlan::from_choices("ALL", "ALL-OVER", RatioSpec::parse("10:1-10", 5)?)?;
//! assert_eq!(plan.baseline_runs(), 8 * 5);
//! assert_eq!(plan.corrected_runs(), 8 * 4 * 5);
//! # Ok::<(), trueno_imbalance::Error>(())
//! ```

use std::path::PathBuf;
use std::str::FromStr;

use tracing::{debug, info};

use crate::classifier::{ClassificationTechnique, Classifier, RunConfig, Subset};
use crate::correction::{CorrectionFamily, ImbalanceCorrection};
use crate::dataset::Dataset;
use crate::options::DEFAULT_LABEL_COLUMN;
use crate::ratio::{ratio_label, RatioSpec};
use crate::results::{ResultStore, RunOutcome};
use crate::Result;

/// Classifier choice selecting every technique.
pub const ALL_CLASSIFIERS: &str = "ALL";
/// Correction choice selecting every oversampling technique.
pub const ALL_OVER: &str = "ALL-OVER";
/// Correction choice selecting every combined technique.
pub const ALL_COMBINED: &str = "ALL-COMBINED";
/// Correction choice disabling correction; also the correction column value.
pub const NO_CORRECTION: &str = "NONE";

/// What to sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepPlan {
    /// Classification techniques, in sweep order
    pub classifiers: Vec<ClassificationTechnique>,
    /// Corrections for the corrected phase; `None` runs without correction
    pub corrections: Vec<Option<ImbalanceCorrection>>,
    /// Crop value and weed values
    pub ratio: RatioSpec,
}

impl SweepPlan {
    /// Build a plan from classifier and correction choices.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownClassifier`] or
    /// [`crate::Error::UnknownCorrection`] for unrecognised names.
    pub fn from_choices(classifier: &str, algorithm: &str, ratio: RatioSpec) -> Result<Self> {
        Ok(Self {
            classifiers: parse_classifiers(classifier)?,
            corrections: parse_corrections(algorithm)?,
            ratio,
        })
    }

    /// Number of uncorrected runs.
    #[must_use]
    pub fn baseline_runs(&self) -> usize {
        self.classifiers.len() * self.ratio.weeds().len()
    }

    /// Number of corrected runs.
    #[must_use]
    pub fn corrected_runs(&self) -> usize {
        self.classifiers.len() * self.corrections.len() * self.ratio.weeds().len()
    }
}

/// Resolve a classifier choice (`ALL` or one technique name).
///
/// # Errors
///
/// Returns [`crate::Error::UnknownClassifier`] for an unrecognised name.
pub fn parse_classifiers(choice: &str) -> Result<Vec<ClassificationTechnique>> {
    if choice.eq_ignore_ascii_case(ALL_CLASSIFIERS) {
        return Ok(ClassificationTechnique::ALL.to_vec());
    }
    Ok(vec![ClassificationTechnique::from_str(choice)?])
}

/// Resolve a correction choice (`ALL-OVER`, `ALL-COMBINED`, `NONE` or one
/// technique name).
///
/// # Errors
///
/// Returns [`crate::Error::UnknownCorrection`] for an unrecognised name.
pub fn parse_corrections(choice: &str) -> Result<Vec<Option<ImbalanceCorrection>>> {
    let family = |family: CorrectionFamily| -> Vec<Option<ImbalanceCorrection>> {
        ImbalanceCorrection::of_family(family)
            .into_iter()
            .map(Some)
            .collect()
    };
    match choice.to_ascii_uppercase().as_str() {
        ALL_OVER => Ok(family(CorrectionFamily::Oversampling)),
        ALL_COMBINED => Ok(family(CorrectionFamily::Combined)),
        NO_CORRECTION => Ok(vec![None]),
        _ => Ok(vec![Some(ImbalanceCorrection::from_str(choice)?)]),
    }
}

/// Every accepted classifier choice: the technique names, then `ALL`.
#[must_use]
pub fn classifier_choices() -> Vec<&'static str> {
    ClassificationTechnique::ALL
        .into_iter()
        .map(ClassificationTechnique::name)
        .chain([ALL_CLASSIFIERS])
        .collect()
}

/// Every accepted correction choice: the technique names, then the
/// family selectors and `NONE`.
#[must_use]
pub fn correction_choices() -> Vec<&'static str> {
    ImbalanceCorrection::ALL
        .into_iter()
        .map(ImbalanceCorrection::name)
        .chain([ALL_OVER, ALL_COMBINED, NO_CORRECTION])
        .collect()
}

/// One classifier run requested by the sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunRequest {
    /// Classification technique
    pub classification: ClassificationTechnique,
    /// Correction, or `None` for an uncorrected run
    pub correction: Option<ImbalanceCorrection>,
    /// Target crop:weed ratio
    pub ratio: (f64, f64),
    /// Whether this run belongs to the corrected phase
    pub corrected: bool,
}

impl RunRequest {
    /// Ratio label, e.g. `10.0:3.25`.
    #[must_use]
    pub fn ratio_label(&self) -> String {
        ratio_label(self.ratio.0, self.ratio.1)
    }

    /// Correction column value.
    #[must_use]
    pub fn correction_name(&self) -> &'static str {
        self.correction.map_or(NO_CORRECTION, ImbalanceCorrection::name)
    }
}

/// Performs one classifier run.
pub trait ExperimentRunner {
    /// Load, correct, train and assess for `request`.
    ///
    /// # Errors
    ///
    /// Returns error if any stage of the run fails.
    fn run(&mut self, request: &RunRequest) -> Result<RunOutcome>;
}

/// Runs requests against an in-memory dataset.
#[derive(Debug)]
pub struct DatasetRunner {
    data: Dataset,
    selections: Vec<String>,
    label_column: String,
    subset: Subset,
    output_directory: PathBuf,
    seed: u64,
}

impl DatasetRunner {
    /// Runner over `data` training on `selections`.
    #[must_use]
    pub fn new(data: Dataset, selections: Vec<String>) -> Self {
        Self {
            data,
            selections,
            label_column: DEFAULT_LABEL_COLUMN.to_string(),
            subset: Subset::Train,
            output_directory: PathBuf::from("."),
            seed: 42,
        }
    }

    /// Set the label column written into corrected datasets.
    #[must_use]
    pub fn with_label_column(mut self, label_column: impl Into<String>) -> Self {
        self.label_column = label_column.into();
        self
    }

    /// Set the subset corrections apply to.
    #[must_use]
    pub const fn with_subset(mut self, subset: Subset) -> Self {
        self.subset = subset;
        self
    }

    /// Set where corrected datasets are written.
    #[must_use]
    pub fn with_output_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.output_directory = directory.into();
        self
    }

    /// Set the seed shared by every run.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn config_for(&self, request: &RunRequest) -> RunConfig {
        let mut config = RunConfig::new(self.selections.clone())
            .target_ratio(request.ratio.0, request.ratio.1)
            .correct_subset(self.subset)
            .seed(self.seed);
        config.label_column.clone_from(&self.label_column);
        if request.corrected {
            config = config.write_dataset_to(&self.output_directory);
        }
        if let Some(correction) = request.correction {
            config = config.correction(correction);
        }
        config
    }
}

impl ExperimentRunner for DatasetRunner {
    fn run(&mut self, request: &RunRequest) -> Result<RunOutcome> {
        let technique = request.classification;
        let mut classifier = Classifier::new(technique, self.config_for(request));
        classifier.load(&self.data, technique.requires_stratification())?;
        classifier.train()?;
        let metrics = classifier.assess()?;
        Ok(RunOutcome::new(classifier.name(), metrics))
    }
}

/// Run counts of a finished sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SweepSummary {
    /// Uncorrected runs
    pub baseline_runs: usize,
    /// Corrected runs
    pub corrected_runs: usize,
}

/// Drives a [`SweepPlan`] through a runner into a [`ResultStore`].
#[derive(Debug, Clone)]
pub struct ParameterSweeper {
    plan: SweepPlan,
}

impl ParameterSweeper {
    /// Sweeper for `plan`.
    #[must_use]
    pub const fn new(plan: SweepPlan) -> Self {
        Self { plan }
    }

    /// Get the plan.
    #[must_use]
    pub const fn plan(&self) -> &SweepPlan {
        &self.plan
    }

    /// Run the uncorrected phase to completion, then the corrected phase.
    ///
    /// # Errors
    ///
    /// Returns the first run or recording error; later runs are not attempted.
    pub fn run<R: ExperimentRunner + ?Sized>(
        &self,
        runner: &mut R,
        store: &mut ResultStore,
    ) -> Result<SweepSummary> {
        let crop = self.plan.ratio.crop();
        let mut summary = SweepSummary::default();

        info!(runs = self.plan.baseline_runs(), "Establishing uncorrected baselines");
        for &classification in &self.plan.classifiers {
            for &weed in self.plan.ratio.weeds() {
                let request = RunRequest {
                    classification,
                    correction: None,
                    ratio: (crop, weed),
                    corrected: false,
                };
                self.execute(runner, store, &request)?;
                summary.baseline_runs += 1;
            }
        }

        info!(runs = self.plan.corrected_runs(), "Running corrected sweep");
        for &classification in &self.plan.classifiers {
            for &correction in &self.plan.corrections {
                for &weed in self.plan.ratio.weeds() {
                    let request = RunRequest {
                        classification,
                        correction,
                        ratio: (crop, weed),
                        corrected: true,
                    };
                    self.execute(runner, store, &request)?;
                    summary.corrected_runs += 1;
                }
            }
        }

        info!(
            baseline = summary.baseline_runs,
            corrected = summary.corrected_runs,
            "Sweep complete"
        );
        Ok(summary)
    }

    #[allow(clippy::unused_self)]
    fn execute<R: ExperimentRunner + ?Sized>(
        &self,
        runner: &mut R,
        store: &mut ResultStore,
        request: &RunRequest,
    ) -> Result<()> {
        let ratio = request.ratio_label();
        debug!(
            classifier = request.classification.name(),
            correction = request.correction_name(),
            ratio = %ratio,
            corrected = request.corrected,
            "Run"
        );
        let outcome = runner.run(request)?;
        store.record_result(
            request.classification.name(),
            request.correction_name(),
            &ratio,
            &outcome,
            request.corrected,
        )
    }
}
