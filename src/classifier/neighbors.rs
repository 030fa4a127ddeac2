//! k-nearest neighbours classification.

use aprender::classification::KNearestNeighbors as AprenderKnn;

use super::{check_training_input, not_fitted, to_matrix, training_error, Model};
use crate::dataset::WEED;
use crate::linalg::{column_stats, standardize};
use crate::Result;

/// k-nearest neighbours on standardized features, backed by aprender.
///
/// The weed probability of a row is the weed fraction among its `k`
/// nearest training rows. `k` is capped at the number of training rows.
#[derive(Debug, Clone)]
pub struct KNearestNeighbors {
    k: usize,
    fitted: Option<Fitted>,
}

#[derive(Debug, Clone)]
struct Fitted {
    mean: Vec<f32>,
    std: Vec<f32>,
    model: AprenderKnn,
}

impl KNearestNeighbors {
    /// Creates a kNN classifier with `k` neighbours.
    #[must_use]
    pub const fn new(k: usize) -> Self {
        Self { k, fitted: None }
    }
}

impl Model for KNearestNeighbors {
    fn fit(&mut self, x: &[Vec<f32>], y: &[usize]) -> Result<()> {
        check_training_input(x, y)?;
        let (mean, std) = column_stats(x);
        let rows: Vec<Vec<f32>> = x.iter().map(|row| standardize(row, &mean, &std)).collect();

        let mut model = AprenderKnn::new(self.k.clamp(1, x.len()));
        model.fit(&to_matrix(&rows)?, y).map_err(training_error)?;
        self.fitted = Some(Fitted { mean, std, model });
        Ok(())
    }

    fn predict_proba(&self, x: &[Vec<f32>]) -> Result<Vec<f64>> {
        let fitted = self.fitted.as_ref().ok_or_else(|| not_fitted("KNearestNeighbors"))?;
        let rows: Vec<Vec<f32>> = x
            .iter()
            .map(|row| standardize(row, &fitted.mean, &fitted.std))
            .collect();

        let proba = fitted.model.predict_proba(&to_matrix(&rows)?).map_err(training_error)?;
        // A training set without weeds yields a single class column
        Ok(proba
            .iter()
            .map(|classes| classes.get(WEED).copied().map_or(0.0, f64::from))
            .collect())
    }
}
