//! Binary classification metrics
//!
//! Everything a run reports: the ROC curve (as parallel FPR/TPR
//! sequences), its trapezoidal AUC, F1 and accuracy at a 0.5 threshold.

use serde::{Deserialize, Serialize};

use crate::dataset::WEED;
use crate::{Error, Result};

/// Probability at or above which a row is predicted as weed.
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Metrics produced by one classifier run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Area under the ROC curve
    pub auc: f64,
    /// F1 score of the weed class
    pub f1: f64,
    /// ROC false positive rates
    pub fpr: Vec<f64>,
    /// ROC true positive rates
    pub tpr: Vec<f64>,
    /// Accuracy on the assessed rows
    pub score: f64,
}

impl Metrics {
    /// Compute all metrics from predicted weed probabilities and true labels.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Metric`] if inputs are empty, differ in length, or
    /// lack one of the two classes.
    pub fn compute(probabilities: &[f64], labels: &[usize]) -> Result<Self> {
        let (fpr, tpr) = roc_curve(probabilities, labels)?;
        let auc = trapezoidal_auc(&fpr, &tpr);
        let predicted: Vec<usize> = probabilities
            .iter()
            .map(|&p| usize::from(p >= DECISION_THRESHOLD))
            .collect();

        Ok(Self {
            auc,
            f1: f1_score(&predicted, labels),
            fpr,
            tpr,
            score: accuracy(&predicted, labels),
        })
    }
}

/// ROC curve as `(fpr, tpr)`, one point per distinct score plus the origin.
///
/// Rows are walked by descending score; tied scores move together.
///
/// # Errors
///
/// Returns [`Error::Metric`] on empty or mismatched input, or when either
/// class is absent.
#[allow(clippy::cast_precision_loss)]
pub fn roc_curve(scores: &[f64], labels: &[usize]) -> Result<(Vec<f64>, Vec<f64>)> {
    if scores.is_empty() {
        return Err(Error::Metric("empty input".into()));
    }
    if scores.len() != labels.len() {
        return Err(Error::Metric(format!(
            "scores length {} != labels length {}",
            scores.len(),
            labels.len()
        )));
    }

    let total_pos = labels.iter().filter(|&&l| l == WEED).count();
    let total_neg = labels.len() - total_pos;
    if total_pos == 0 {
        return Err(Error::Metric("no positive samples".into()));
    }
    if total_neg == 0 {
        return Err(Error::Metric("no negative samples".into()));
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let p = total_pos as f64;
    let n = total_neg as f64;
    let mut fpr = vec![0.0];
    let mut tpr = vec![0.0];
    let (mut tp, mut fp) = (0usize, 0usize);

    let mut i = 0;
    while i < order.len() {
        let current = scores[order[i]];
        while i < order.len() && scores[order[i]] == current {
            if labels[order[i]] == WEED {
                tp += 1;
            } else {
                fp += 1;
            }
            i += 1;
        }
        fpr.push(fp as f64 / n);
        tpr.push(tp as f64 / p);
    }

    Ok((fpr, tpr))
}

/// Area under a piecewise-linear curve.
#[must_use]
pub fn trapezoidal_auc(x: &[f64], y: &[f64]) -> f64 {
    x.windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| (xs[1] - xs[0]).abs() * (ys[1] + ys[0]) / 2.0)
        .sum()
}

/// F1 score of the weed class; 0 when there are no true or predicted weeds.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn f1_score(predicted: &[usize], actual: &[usize]) -> f64 {
    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut fn_ = 0usize;
    for (&p, &a) in predicted.iter().zip(actual) {
        match (p == WEED, a == WEED) {
            (true, true) => tp += 1,
            (true, false) => fp += 1,
            (false, true) => fn_ += 1,
            (false, false) => {}
        }
    }
    let denom = 2 * tp + fp + fn_;
    if denom == 0 {
        0.0
    } else {
        (2 * tp) as f64 / denom as f64
    }
}

/// Fraction of matching labels; 0 for empty input.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn accuracy(predicted: &[usize], actual: &[usize]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let correct = predicted.iter().zip(actual).filter(|(p, a)| p == a).count();
    correct as f64 / actual.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_separation() {
        let metrics = Metrics::compute(&[0.9, 0.8, 0.2, 0.1], &[1, 1, 0, 0]).unwrap();
        assert!((metrics.auc - 1.0).abs() < 1e-12);
        assert!((metrics.f1 - 1.0).abs() < 1e-12);
        assert!((metrics.score - 1.0).abs() < 1e-12);
        assert_eq!(metrics.fpr.first(), Some(&0.0));
        assert_eq!(metrics.fpr.last(), Some(&1.0));
        assert_eq!(metrics.tpr.last(), Some(&1.0));
    }

    #[test]
    fn test_constant_scores_give_diagonal() {
        let (fpr, tpr) = roc_curve(&[0.5; 4], &[1, 0, 1, 0]).unwrap();
        assert_eq!(fpr, vec![0.0, 1.0]);
        assert_eq!(tpr, vec![0.0, 1.0]);
        assert!((trapezoidal_auc(&fpr, &tpr) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_inverted_scores() {
        let metrics = Metrics::compute(&[0.1, 0.2, 0.8, 0.9], &[1, 1, 0, 0]).unwrap();
        assert!(metrics.auc.abs() < 1e-12);
        assert!(metrics.f1.abs() < 1e-12);
    }

    #[test]
    fn test_single_class_rejected() {
        assert!(roc_curve(&[0.1, 0.2], &[0, 0]).is_err());
        assert!(roc_curve(&[0.1, 0.2], &[1, 1]).is_err());
        assert!(roc_curve(&[], &[]).is_err());
        assert!(roc_curve(&[0.1], &[0, 1]).is_err());
    }

    #[test]
    fn test_f1_and_accuracy() {
        let predicted = [1, 0, 1, 0];
        let actual = [1, 1, 0, 0];
        assert!((f1_score(&predicted, &actual) - 0.5).abs() < 1e-12);
        assert!((accuracy(&predicted, &actual) - 0.5).abs() < 1e-12);
        assert!(f1_score(&[0, 0], &[0, 0]).abs() < 1e-12);
    }
}
