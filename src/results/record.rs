//! Result rows - one per classifier run

use serde::{Serialize, Serializer};

/// Corrected-run row.
///
/// Column order is fixed: `classification, ratio, correction, auc, f1, fpr,
/// score, auc-delta, f1-delta, fpr-delta`, preceded by an unnamed row index.
/// Deltas are taken against the uncorrected baseline sharing
/// `(classification, ratio)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRecord {
    #[serde(rename = "")]
    index: usize,
    classification: String,
    ratio: String,
    correction: String,
    auc: f64,
    f1: f64,
    #[serde(serialize_with = "serialize_rates")]
    fpr: Vec<f64>,
    score: f64,
    #[serde(rename = "auc-delta")]
    auc_delta: f64,
    #[serde(rename = "f1-delta")]
    f1_delta: f64,
    #[serde(rename = "fpr-delta")]
    fpr_delta: f64,
}

impl ResultRecord {
    /// Build a corrected row from its metrics and baseline.
    ///
    /// `fpr-delta` is always recorded as 0: the false-positive-rate columns
    /// are whole ROC sequences with no single value to subtract.
    #[must_use]
    pub(crate) fn against_baseline(
        index: usize,
        correction: impl Into<String>,
        auc: f64,
        f1: f64,
        fpr: Vec<f64>,
        score: f64,
        baseline: &BaselineRecord,
    ) -> Self {
        Self {
            index,
            classification: baseline.classification.clone(),
            ratio: baseline.ratio.clone(),
            correction: correction.into(),
            auc,
            f1,
            fpr,
            score,
            auc_delta: auc - baseline.auc,
            f1_delta: f1 - baseline.f1,
            fpr_delta: 0.0,
        }
    }

    /// Get the row index.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Get the classification technique.
    #[must_use]
    pub fn classification(&self) -> &str {
        &self.classification
    }

    /// Get the ratio label.
    #[must_use]
    pub fn ratio(&self) -> &str {
        &self.ratio
    }

    /// Get the correction technique.
    #[must_use]
    pub fn correction(&self) -> &str {
        &self.correction
    }

    /// Get the AUC.
    #[must_use]
    pub const fn auc(&self) -> f64 {
        self.auc
    }

    /// Get the F1 score.
    #[must_use]
    pub const fn f1(&self) -> f64 {
        self.f1
    }

    /// Get the ROC false positive rates.
    #[must_use]
    pub fn fpr(&self) -> &[f64] {
        &self.fpr
    }

    /// Get the accuracy score.
    #[must_use]
    pub const fn score(&self) -> f64 {
        self.score
    }

    /// Get the AUC change against the baseline.
    #[must_use]
    pub const fn auc_delta(&self) -> f64 {
        self.auc_delta
    }

    /// Get the F1 change against the baseline.
    #[must_use]
    pub const fn f1_delta(&self) -> f64 {
        self.f1_delta
    }

    /// Get the FPR change against the baseline (always 0).
    #[must_use]
    pub const fn fpr_delta(&self) -> f64 {
        self.fpr_delta
    }
}

/// Uncorrected-run row: `classification, ratio, auc, f1, fpr, score`,
/// preceded by an unnamed row index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaselineRecord {
    #[serde(rename = "")]
    index: usize,
    classification: String,
    ratio: String,
    auc: f64,
    f1: f64,
    #[serde(serialize_with = "serialize_rates")]
    fpr: Vec<f64>,
    score: f64,
}

impl BaselineRecord {
    #[must_use]
    pub(crate) fn new(
        index: usize,
        classification: impl Into<String>,
        ratio: impl Into<String>,
        auc: f64,
        f1: f64,
        fpr: Vec<f64>,
        score: f64,
    ) -> Self {
        Self {
            index,
            classification: classification.into(),
            ratio: ratio.into(),
            auc,
            f1,
            fpr,
            score,
        }
    }

    /// Get the row index.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Get the classification technique.
    #[must_use]
    pub fn classification(&self) -> &str {
        &self.classification
    }

    /// Get the ratio label.
    #[must_use]
    pub fn ratio(&self) -> &str {
        &self.ratio
    }

    /// Get the AUC.
    #[must_use]
    pub const fn auc(&self) -> f64 {
        self.auc
    }

    /// Get the F1 score.
    #[must_use]
    pub const fn f1(&self) -> f64 {
        self.f1
    }

    /// Get the ROC false positive rates.
    #[must_use]
    pub fn fpr(&self) -> &[f64] {
        &self.fpr
    }

    /// Get the accuracy score.
    #[must_use]
    pub const fn score(&self) -> f64 {
        self.score
    }
}

/// Render a rate sequence as `[a, b, c]`.
#[must_use]
pub fn format_rates(rates: &[f64]) -> String {
    let inner: Vec<String> = rates.iter().map(|r| format!("{r:?}")).collect();
    format!("[{}]", inner.join(", "))
}

#[allow(clippy::ptr_arg)]
fn serialize_rates<S: Serializer>(rates: &Vec<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_rates(rates))
}
