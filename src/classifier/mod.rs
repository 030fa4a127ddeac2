//! Classifiers and the load/correct/train/assess run.
//!
//! [`ClassificationTechnique`] is the closed set of models a sweep can use.
//! Each technique builds a [`Model`]; a [`Classifier`] wraps one model with
//! the per-run configuration and drives it through a single experiment:
//!
//! ```text
//! load ─► select features ─► subsample to ratio ─► split ─► correct ─► train ─► assess
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use trueno_imbalance::classifier::{ClassificationTechnique, Classifier, RunConfig};
//! use trueno_imbalance::dataset::Dataset;
//!
//! let data = Dataset::load("weeds.csv", "type")?;
//! let config = RunConfig::new(vec!["hue".into(), "area".into()]).target_ratio(10.0, 2.0);
//! let technique = ClassificationTechnique::RandomForest;
//!
//! let mut classifier = Classifier::new(technique, config);
//! classifier.load(&data, technique.requires_stratification())?;
//! classifier.train()?;
//! let metrics = classifier.assess()?;
//! println!("AUC {}", metrics.auc);
//! # Ok::<(), trueno_imbalance::Error>(())
//! ```

mod linear;
mod mlp;
mod neighbors;
mod tree;

pub use linear::{LinearDiscriminant, LinearSvm, LogisticRegression};
pub use mlp::Mlp;
pub use neighbors::KNearestNeighbors;
pub use tree::{DecisionTree, GradientBoosting, RandomForest};

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use aprender::primitives::Matrix;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::correction::ImbalanceCorrection;
use crate::dataset::{Dataset, TEST_FRACTION};
use crate::metrics::Metrics;
use crate::options::DEFAULT_LABEL_COLUMN;
use crate::ratio::ratio_label;
use crate::{Error, Result};

/// A binary classifier producing weed probabilities.
pub trait Model: fmt::Debug {
    /// Fit the model to feature rows `x` with 0/1 labels `y`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Training`] on empty or inconsistent input.
    fn fit(&mut self, x: &[Vec<f32>], y: &[usize]) -> Result<()>;

    /// Probability of the weed class for each row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Training`] if the model has not been fitted.
    fn predict_proba(&self, x: &[Vec<f32>]) -> Result<Vec<f64>>;
}

/// Validate training input shared by every model.
pub(crate) fn check_training_input(x: &[Vec<f32>], y: &[usize]) -> Result<()> {
    if x.is_empty() {
        return Err(Error::Training("cannot fit with zero samples".into()));
    }
    if x.len() != y.len() {
        return Err(Error::Training(format!(
            "{} samples but {} labels",
            x.len(),
            y.len()
        )));
    }
    if y.iter().any(|&label| label > 1) {
        return Err(Error::Training("labels must be 0 or 1".into()));
    }
    Ok(())
}

pub(crate) fn not_fitted(model: &str) -> Error {
    Error::Training(format!("{model} has not been fitted"))
}

/// Pack feature rows into a row-major aprender matrix.
pub(crate) fn to_matrix(x: &[Vec<f32>]) -> Result<Matrix<f32>> {
    let cols = x.first().map_or(0, Vec::len);
    Matrix::from_vec(x.len(), cols, x.concat()).map_err(training_error)
}

pub(crate) fn training_error(e: impl fmt::Display) -> Error {
    Error::Training(e.to_string())
}

/// Closed set of classification techniques.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassificationTechnique {
    /// Logistic regression
    LogisticRegression,
    /// k-nearest neighbours
    Knn,
    /// CART decision tree
    DecisionTree,
    /// Bagged decision trees
    RandomForest,
    /// Gradient boosted trees on log-loss
    GradientBoosting,
    /// Linear support vector machine
    Svm,
    /// Linear discriminant analysis
    Lda,
    /// Multi-layer perceptron
    Mlp,
}

impl ClassificationTechnique {
    /// Every technique, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::LogisticRegression,
        Self::Knn,
        Self::DecisionTree,
        Self::RandomForest,
        Self::GradientBoosting,
        Self::Svm,
        Self::Lda,
        Self::Mlp,
    ];

    /// Canonical upper-case name used in result tables.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::LogisticRegression => "LOGISTIC",
            Self::Knn => "KNN",
            Self::DecisionTree => "DECISIONTREE",
            Self::RandomForest => "RANDOMFOREST",
            Self::GradientBoosting => "GRADIENT",
            Self::Svm => "SVM",
            Self::Lda => "LDA",
            Self::Mlp => "MLP",
        }
    }

    /// Human-readable name used for ROC series.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::LogisticRegression => "Logistic Regression",
            Self::Knn => "K-Nearest Neighbors",
            Self::DecisionTree => "Decision Tree",
            Self::RandomForest => "Random Forest",
            Self::GradientBoosting => "Gradient Boosting",
            Self::Svm => "Support Vector Machine",
            Self::Lda => "Linear Discriminant Analysis",
            Self::Mlp => "Multi-layer Perceptron",
        }
    }

    /// Whether the train/test split must preserve class proportions.
    #[must_use]
    pub const fn requires_stratification(self) -> bool {
        matches!(self, Self::RandomForest)
    }

    /// Build an unfitted model; `seed` drives any internal randomness.
    #[must_use]
    pub fn build_model(self, seed: u64) -> Box<dyn Model> {
        match self {
            Self::LogisticRegression => {
                Box::new(LogisticRegression::new().with_learning_rate(0.5).with_max_iter(500))
            }
            Self::Knn => Box::new(KNearestNeighbors::new(5)),
            Self::DecisionTree => Box::new(DecisionTree::new()),
            Self::RandomForest => Box::new(RandomForest::new(50).with_random_state(seed)),
            Self::GradientBoosting => Box::new(GradientBoosting::new()),
            Self::Svm => Box::new(LinearSvm::new()),
            Self::Lda => Box::new(LinearDiscriminant::new()),
            Self::Mlp => Box::new(Mlp::new(16).with_random_state(seed)),
        }
    }
}

impl fmt::Display for ClassificationTechnique {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ClassificationTechnique {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownClassifier(s.to_string()))
    }
}

/// Which part of the data imbalance correction is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Subset {
    /// Correct the training rows only.
    #[default]
    Train,
    /// Correct the test rows only.
    Test,
    /// Correct before splitting.
    All,
}

impl Subset {
    /// Every subset.
    pub const ALL: [Self; 3] = [Self::Train, Self::Test, Self::All];

    /// Canonical upper-case name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Train => "TRAIN",
            Self::Test => "TEST",
            Self::All => "ALL",
        }
    }
}

impl FromStr for Subset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TRAIN" => Ok(Self::Train),
            "TEST" => Ok(Self::Test),
            "ALL" => Ok(Self::All),
            _ => Err(Error::UnknownSubset(s.to_string())),
        }
    }
}

/// Configuration applied to one classifier run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Feature columns to train on
    pub selections: Vec<String>,
    /// Label column name (used when writing corrected data)
    pub label_column: String,
    /// Subset the correction applies to
    pub correct_subset: Subset,
    /// Directory for corrected dataset files
    pub output_directory: PathBuf,
    /// Whether to write the corrected dataset to disk
    pub write_dataset: bool,
    /// Correction technique; `None` disables correction
    pub correction: Option<ImbalanceCorrection>,
    /// Desired crop:weed ratio; a zero side keeps the natural ratio
    pub target_ratio: (f64, f64),
    /// Seed for subsampling, splitting, correction and the model
    pub seed: u64,
}

impl RunConfig {
    /// Configuration with the given feature selections and defaults elsewhere.
    #[must_use]
    pub fn new(selections: Vec<String>) -> Self {
        Self {
            selections,
            label_column: DEFAULT_LABEL_COLUMN.to_string(),
            correct_subset: Subset::Train,
            output_directory: PathBuf::from("."),
            write_dataset: false,
            correction: None,
            target_ratio: (0.0, 0.0),
            seed: 42,
        }
    }

    /// Set the desired crop:weed ratio.
    #[must_use]
    pub const fn target_ratio(mut self, crop: f64, weed: f64) -> Self {
        self.target_ratio = (crop, weed);
        self
    }

    /// Enable correction with the given technique.
    #[must_use]
    pub const fn correction(mut self, correction: ImbalanceCorrection) -> Self {
        self.correction = Some(correction);
        self
    }

    /// Set the correction subset.
    #[must_use]
    pub const fn correct_subset(mut self, subset: Subset) -> Self {
        self.correct_subset = subset;
        self
    }

    /// Write the corrected dataset into `directory`.
    #[must_use]
    pub fn write_dataset_to(mut self, directory: impl Into<PathBuf>) -> Self {
        self.output_directory = directory.into();
        self.write_dataset = true;
        self
    }

    /// Set the RNG seed.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// One classifier run.
#[derive(Debug)]
pub struct Classifier {
    technique: ClassificationTechnique,
    config: RunConfig,
    model: Box<dyn Model>,
    rng: StdRng,
    train: Option<Dataset>,
    test: Option<Dataset>,
    trained: bool,
}

impl Classifier {
    /// Create a classifier for `technique` with the run configuration.
    #[must_use]
    pub fn new(technique: ClassificationTechnique, config: RunConfig) -> Self {
        Self {
            technique,
            model: technique.build_model(config.seed),
            rng: StdRng::seed_from_u64(config.seed),
            config,
            train: None,
            test: None,
            trained: false,
        }
    }

    /// Display name (ROC series key).
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.technique.display_name()
    }

    /// Training rows after correction, once loaded.
    #[must_use]
    pub const fn train_set(&self) -> Option<&Dataset> {
        self.train.as_ref()
    }

    /// Test rows after correction, once loaded.
    #[must_use]
    pub const fn test_set(&self) -> Option<&Dataset> {
        self.test.as_ref()
    }

    /// Prepare train and test sets from `data`.
    ///
    /// Selects features, subsamples to the target ratio, splits (stratified
    /// when asked), applies the configured correction to the configured
    /// subset, and writes the corrected rows when configured to.
    ///
    /// # Errors
    ///
    /// Returns error if a selected column is missing, the ratio cannot be
    /// met, the split or correction fails, or the corrected rows cannot be written.
    pub fn load(&mut self, data: &Dataset, stratify: bool) -> Result<()> {
        let (crop, weed) = self.config.target_ratio;
        let selected = data.select(&self.config.selections)?;
        let sampled = selected.subsample_to_ratio(crop, weed, &mut self.rng)?;
        debug!(
            classifier = self.technique.name(),
            ratio = %ratio_label(crop, weed),
            counts = ?sampled.class_counts(),
            stratify,
            "Loaded"
        );

        let (train, test) = match (self.config.correction, self.config.correct_subset) {
            (Some(correction), Subset::All) => {
                let corrected = correction.resample(&sampled, &mut self.rng)?;
                self.persist(&corrected)?;
                corrected.train_test_split(TEST_FRACTION, stratify, &mut self.rng)?
            }
            (Some(correction), Subset::Train) => {
                let (train, test) = sampled.train_test_split(TEST_FRACTION, stratify, &mut self.rng)?;
                let train = correction.resample(&train, &mut self.rng)?;
                self.persist(&train)?;
                (train, test)
            }
            (Some(correction), Subset::Test) => {
                let (train, test) = sampled.train_test_split(TEST_FRACTION, stratify, &mut self.rng)?;
                let test = correction.resample(&test, &mut self.rng)?;
                self.persist(&test)?;
                (train, test)
            }
            (None, _) => sampled.train_test_split(TEST_FRACTION, stratify, &mut self.rng)?,
        };

        self.train = Some(train);
        self.test = Some(test);
        self.trained = false;
        Ok(())
    }

    /// Fit the model on the training rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Training`] if nothing is loaded or fitting fails.
    pub fn train(&mut self) -> Result<()> {
        let train = self
            .train
            .as_ref()
            .ok_or_else(|| Error::Training("train called before load".into()))?;
        self.model.fit(train.rows(), train.labels())?;
        self.trained = true;
        Ok(())
    }

    /// Score the fitted model on the test rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Training`] if the model is not trained, or
    /// [`Error::Metric`] if the test rows lack a class.
    pub fn assess(&self) -> Result<Metrics> {
        let test = self
            .test
            .as_ref()
            .filter(|_| self.trained)
            .ok_or_else(|| Error::Training("assess called before train".into()))?;
        let probabilities = self.model.predict_proba(test.rows())?;
        Metrics::compute(&probabilities, test.labels())
    }

    fn persist(&self, corrected: &Dataset) -> Result<()> {
        if !self.config.write_dataset {
            return Ok(());
        }
        let Some(correction) = self.config.correction else {
            return Ok(());
        };
        let (crop, weed) = self.config.target_ratio;
        let file_name = format!(
            "{}-{}-{}.csv",
            self.technique.name(),
            correction.name(),
            ratio_label(crop, weed).replace(':', "-")
        )
        .to_lowercase();
        let path = self.config.output_directory.join(file_name);
        debug!(path = %path.display(), rows = corrected.len(), "Writing corrected dataset");
        corrected.write_csv(path, &self.config.label_column)
    }
}
