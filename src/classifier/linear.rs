//! Linear models: logistic regression, linear SVM and LDA.
//!
//! Logistic regression and the SVM are aprender estimators fitted on
//! features standardized with training-row statistics. LDA has no aprender
//! counterpart and is solved in closed form here. Every model scores a row
//! as `sigmoid(w·x + b)`.

use aprender::classification::{LinearSVM, LogisticRegression as AprenderLogistic};

use super::{check_training_input, not_fitted, to_matrix, training_error, Model};
use crate::linalg::{column_stats, dot, sigmoid, standardize};
use crate::{Error, Result};

/// Fitted linear scorer on standardized features.
#[derive(Debug, Clone)]
struct LinearFit {
    mean: Vec<f32>,
    std: Vec<f32>,
    weights: Vec<f32>,
    intercept: f64,
}

impl LinearFit {
    fn decision(&self, row: &[f32]) -> f64 {
        let z = standardize(row, &self.mean, &self.std);
        f64::from(dot(&self.weights, &z)) + self.intercept
    }

    fn proba(&self, x: &[Vec<f32>]) -> Vec<f64> {
        x.iter().map(|row| sigmoid(self.decision(row))).collect()
    }
}

/// Column statistics of the training rows.
#[derive(Debug, Clone)]
struct Scaling {
    mean: Vec<f32>,
    std: Vec<f32>,
}

impl Scaling {
    fn apply(&self, x: &[Vec<f32>]) -> Vec<Vec<f32>> {
        x.iter().map(|row| standardize(row, &self.mean, &self.std)).collect()
    }
}

fn standardized(x: &[Vec<f32>]) -> (Vec<f32>, Vec<f32>, Vec<Vec<f32>>) {
    let (mean, std) = column_stats(x);
    let z = x.iter().map(|row| standardize(row, &mean, &std)).collect();
    (mean, std, z)
}

/// Logistic regression: aprender's gradient-descent fit on log-loss.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    learning_rate: f32,
    max_iter: usize,
    fitted: Option<(Scaling, AprenderLogistic)>,
}

impl LogisticRegression {
    /// Creates a logistic regression with aprender's defaults
    /// (learning rate 0.01, 1000 iterations).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            learning_rate: 0.01,
            max_iter: 1000,
            fitted: None,
        }
    }

    /// Sets the learning rate.
    #[must_use]
    pub const fn with_learning_rate(mut self, lr: f32) -> Self {
        self.learning_rate = lr;
        self
    }

    /// Sets the maximum number of iterations.
    #[must_use]
    pub const fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl Model for LogisticRegression {
    fn fit(&mut self, x: &[Vec<f32>], y: &[usize]) -> Result<()> {
        check_training_input(x, y)?;
        let (mean, std) = column_stats(x);
        let scaling = Scaling { mean, std };

        let mut model = AprenderLogistic::new()
            .with_learning_rate(self.learning_rate)
            .with_max_iter(self.max_iter)
            .with_tolerance(1e-6);
        model
            .fit(&to_matrix(&scaling.apply(x))?, y)
            .map_err(training_error)?;
        self.fitted = Some((scaling, model));
        Ok(())
    }

    fn predict_proba(&self, x: &[Vec<f32>]) -> Result<Vec<f64>> {
        let (scaling, model) = self
            .fitted
            .as_ref()
            .ok_or_else(|| not_fitted("LogisticRegression"))?;
        let proba = model.predict_proba(&to_matrix(&scaling.apply(x))?);
        Ok((0..proba.len()).map(|i| f64::from(proba[i])).collect())
    }
}

/// Linear support vector machine: aprender's sub-gradient hinge-loss fit.
///
/// Probabilities are the sigmoid of the signed margin.
#[derive(Debug, Clone)]
pub struct LinearSvm {
    c: f32,
    fitted: Option<(Scaling, LinearSVM)>,
}

impl LinearSvm {
    /// Creates a linear SVM with `C` = 1.
    #[must_use]
    pub const fn new() -> Self {
        Self { c: 1.0, fitted: None }
    }

    /// Sets the regularization parameter `C`; larger means less regularization.
    #[must_use]
    pub const fn with_c(mut self, c: f32) -> Self {
        self.c = c;
        self
    }
}

impl Default for LinearSvm {
    fn default() -> Self {
        Self::new()
    }
}

impl Model for LinearSvm {
    fn fit(&mut self, x: &[Vec<f32>], y: &[usize]) -> Result<()> {
        check_training_input(x, y)?;
        let (mean, std) = column_stats(x);
        let scaling = Scaling { mean, std };

        let mut model = LinearSVM::new().with_c(self.c).with_max_iter(200);
        model
            .fit(&to_matrix(&scaling.apply(x))?, y)
            .map_err(training_error)?;
        self.fitted = Some((scaling, model));
        Ok(())
    }

    fn predict_proba(&self, x: &[Vec<f32>]) -> Result<Vec<f64>> {
        let (scaling, model) = self.fitted.as_ref().ok_or_else(|| not_fitted("LinearSvm"))?;
        let decisions = model
            .decision_function(&to_matrix(&scaling.apply(x))?)
            .map_err(training_error)?;
        Ok(decisions.into_iter().map(|d| sigmoid(f64::from(d))).collect())
    }
}

/// Two-class linear discriminant analysis with a shared covariance.
///
/// `w = Σ⁻¹(μ₁ − μ₀)`, `b = −½ w·(μ₀ + μ₁) + ln(π₁/π₀)`; the posterior of
/// the weed class is `sigmoid(w·x + b)`.
#[derive(Debug, Clone)]
pub struct LinearDiscriminant {
    shrinkage: f64,
    fit: Option<LinearFit>,
}

impl LinearDiscriminant {
    /// Creates an LDA with a small diagonal shrinkage (1e-4) for stability.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            shrinkage: 1e-4,
            fit: None,
        }
    }
}

impl Default for LinearDiscriminant {
    fn default() -> Self {
        Self::new()
    }
}

impl Model for LinearDiscriminant {
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    fn fit(&mut self, x: &[Vec<f32>], y: &[usize]) -> Result<()> {
        check_training_input(x, y)?;
        let (mean, std, z) = standardized(x);
        let d = mean.len();

        let mut class_mean = [vec![0.0f64; d], vec![0.0f64; d]];
        let mut counts = [0usize; 2];
        for (row, &label) in z.iter().zip(y) {
            counts[label] += 1;
            for (m, v) in class_mean[label].iter_mut().zip(row) {
                *m += f64::from(*v);
            }
        }
        if counts.contains(&0) {
            return Err(Error::Training("LDA needs rows of both classes".into()));
        }
        for (means, &count) in class_mean.iter_mut().zip(&counts) {
            for m in means.iter_mut() {
                *m /= count as f64;
            }
        }

        // Pooled within-class covariance
        let mut cov = vec![vec![0.0f64; d]; d];
        for (row, &label) in z.iter().zip(y) {
            let centered: Vec<f64> = row
                .iter()
                .zip(&class_mean[label])
                .map(|(v, m)| f64::from(*v) - m)
                .collect();
            for a in 0..d {
                for b in 0..d {
                    cov[a][b] += centered[a] * centered[b];
                }
            }
        }
        let dof = (x.len().saturating_sub(2)).max(1) as f64;
        for (a, row) in cov.iter_mut().enumerate() {
            for value in row.iter_mut() {
                *value /= dof;
            }
            row[a] += self.shrinkage;
        }

        let diff: Vec<f64> = class_mean[1]
            .iter()
            .zip(&class_mean[0])
            .map(|(a, b)| a - b)
            .collect();
        let weights = solve(cov, diff)?;

        let midpoint: f64 = weights
            .iter()
            .zip(class_mean[0].iter().zip(&class_mean[1]))
            .map(|(w, (m0, m1))| w * (m0 + m1) / 2.0)
            .sum();
        let prior = (counts[1] as f64 / counts[0] as f64).ln();

        self.fit = Some(LinearFit {
            mean,
            std,
            weights: weights.iter().map(|&w| w as f32).collect(),
            intercept: prior - midpoint,
        });
        Ok(())
    }

    fn predict_proba(&self, x: &[Vec<f32>]) -> Result<Vec<f64>> {
        let fit = self.fit.as_ref().ok_or_else(|| not_fitted("LinearDiscriminant"))?;
        Ok(fit.proba(x))
    }
}

/// Solve `a·x = b` by Gaussian elimination with partial pivoting.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);
        if a[pivot][col].abs() < 1e-12 {
            return Err(Error::Training("singular covariance matrix".into()));
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Ok(x)
}
