//! Tree models: CART decision tree, random forest and gradient boosting.
//!
//! The forest and the booster are aprender ensembles. aprender's single
//! decision tree only predicts labels, so the CART tree lives here: it grows
//! a variance-reduction regression tree over 0/1 targets, which ranks splits
//! exactly as Gini impurity does, and its leaves hold the weed fraction.

use aprender::tree::{GradientBoostingClassifier, RandomForestClassifier};

use super::{check_training_input, not_fitted, to_matrix, training_error, Model};
use crate::dataset::WEED;
use crate::Result;

#[derive(Debug, Clone)]
enum Node {
    Leaf(f64),
    Split {
        feature: usize,
        threshold: f32,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn predict(&self, row: &[f32]) -> f64 {
        match self {
            Self::Leaf(value) => *value,
            Self::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if row[*feature] <= *threshold {
                    left.predict(row)
                } else {
                    right.predict(row)
                }
            }
        }
    }

    fn depth(&self) -> usize {
        match self {
            Self::Leaf(_) => 0,
            Self::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// Grows one tree over `x` fitting the 0/1 `target`.
struct TreeBuilder<'a> {
    x: &'a [Vec<f32>],
    target: &'a [f64],
    max_depth: Option<usize>,
    min_samples_split: usize,
}

impl TreeBuilder<'_> {
    fn build(&self, indices: &[usize], depth: usize) -> Node {
        let depth_reached = self.max_depth.is_some_and(|max| depth >= max);
        if depth_reached || indices.len() < self.min_samples_split {
            return Node::Leaf(self.leaf(indices));
        }

        let Some((feature, threshold)) = self.best_split(indices) else {
            return Node::Leaf(self.leaf(indices));
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| self.x[i][feature] <= threshold);

        Node::Split {
            feature,
            threshold,
            left: Box::new(self.build(&left, depth + 1)),
            right: Box::new(self.build(&right, depth + 1)),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn leaf(&self, indices: &[usize]) -> f64 {
        if indices.is_empty() {
            return 0.0;
        }
        indices.iter().map(|&i| self.target[i]).sum::<f64>() / indices.len() as f64
    }

    /// Split minimizing the summed squared error of both children.
    #[allow(clippy::cast_precision_loss)]
    fn best_split(&self, indices: &[usize]) -> Option<(usize, f32)> {
        let n_features = self.x[indices[0]].len();
        let total: f64 = indices.iter().map(|&i| self.target[i]).sum();
        let total_sq: f64 = indices.iter().map(|&i| self.target[i].powi(2)).sum();
        let n = indices.len() as f64;
        let parent_sse = total_sq - total * total / n;

        let mut best: Option<(usize, f32, f64)> = None;
        let mut sorted = indices.to_vec();
        for feature in 0..n_features {
            sorted.sort_by(|&a, &b| self.x[a][feature].total_cmp(&self.x[b][feature]));

            let (mut left_sum, mut left_sq) = (0.0f64, 0.0f64);
            for pos in 0..sorted.len() - 1 {
                let t = self.target[sorted[pos]];
                left_sum += t;
                left_sq += t * t;

                let here = self.x[sorted[pos]][feature];
                let next = self.x[sorted[pos + 1]][feature];
                if next <= here {
                    continue;
                }

                let n_left = (pos + 1) as f64;
                let n_right = n - n_left;
                let right_sum = total - left_sum;
                let right_sq = total_sq - left_sq;
                let sse = (left_sq - left_sum * left_sum / n_left)
                    + (right_sq - right_sum * right_sum / n_right);

                if best.map_or(true, |(_, _, b)| sse < b) {
                    best = Some((feature, (here + next) / 2.0, sse));
                }
            }
        }

        best.filter(|&(_, _, sse)| parent_sse - sse > 1e-12)
            .map(|(feature, threshold, _)| (feature, threshold))
    }
}

/// CART decision tree; leaves hold the weed fraction of their rows.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    max_depth: Option<usize>,
    min_samples_split: usize,
    root: Option<Node>,
}

impl DecisionTree {
    /// Creates an unbounded tree (`min_samples_split` = 2).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            root: None,
        }
    }

    /// Sets the maximum depth.
    #[must_use]
    pub const fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Depth of the fitted tree.
    #[must_use]
    pub fn depth(&self) -> Option<usize> {
        self.root.as_ref().map(Node::depth)
    }
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl Model for DecisionTree {
    fn fit(&mut self, x: &[Vec<f32>], y: &[usize]) -> Result<()> {
        check_training_input(x, y)?;
        let target: Vec<f64> = y.iter().map(|&l| f64::from(u8::from(l == WEED))).collect();
        let builder = TreeBuilder {
            x,
            target: &target,
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
        };
        let indices: Vec<usize> = (0..x.len()).collect();
        self.root = Some(builder.build(&indices, 0));
        Ok(())
    }

    fn predict_proba(&self, x: &[Vec<f32>]) -> Result<Vec<f64>> {
        let root = self.root.as_ref().ok_or_else(|| not_fitted("DecisionTree"))?;
        Ok(x.iter().map(|row| root.predict(row)).collect())
    }
}

/// Random forest over bootstrap samples; the weed probability is the share
/// of trees voting weed.
#[derive(Debug, Clone)]
pub struct RandomForest {
    n_estimators: usize,
    max_depth: Option<usize>,
    random_state: u64,
    forest: Option<RandomForestClassifier>,
}

impl RandomForest {
    /// Creates a forest of `n_estimators` trees.
    #[must_use]
    pub const fn new(n_estimators: usize) -> Self {
        Self {
            n_estimators,
            max_depth: None,
            random_state: 0,
            forest: None,
        }
    }

    /// Sets the maximum depth of every tree.
    #[must_use]
    pub const fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Sets the seed for bootstrap sampling.
    #[must_use]
    pub const fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }
}

impl Model for RandomForest {
    fn fit(&mut self, x: &[Vec<f32>], y: &[usize]) -> Result<()> {
        check_training_input(x, y)?;
        let mut forest = RandomForestClassifier::new(self.n_estimators.max(1))
            .with_random_state(self.random_state);
        if let Some(depth) = self.max_depth {
            forest = forest.with_max_depth(depth);
        }
        forest.fit(&to_matrix(x)?, y).map_err(training_error)?;
        self.forest = Some(forest);
        Ok(())
    }

    fn predict_proba(&self, x: &[Vec<f32>]) -> Result<Vec<f64>> {
        let forest = self.forest.as_ref().ok_or_else(|| not_fitted("RandomForest"))?;
        // One row at a time: the forest re-predicts the whole matrix per row
        x.iter()
            .map(|row| {
                let proba = forest.predict_proba(&to_matrix(std::slice::from_ref(row))?);
                let (_, n_classes) = proba.shape();
                Ok(if n_classes > WEED {
                    f64::from(proba.get(0, WEED))
                } else {
                    0.0
                })
            })
            .collect()
    }
}

/// Gradient boosting on binary log-loss with depth-limited trees.
#[derive(Debug, Clone)]
pub struct GradientBoosting {
    n_estimators: usize,
    learning_rate: f32,
    max_depth: usize,
    booster: Option<GradientBoostingClassifier>,
}

impl GradientBoosting {
    /// Creates a booster (50 trees, learning rate 0.1, depth 3).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            n_estimators: 50,
            learning_rate: 0.1,
            max_depth: 3,
            booster: None,
        }
    }

    /// Sets the number of boosting rounds.
    #[must_use]
    pub const fn with_n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n;
        self
    }

    /// Sets the shrinkage applied to each tree.
    #[must_use]
    pub const fn with_learning_rate(mut self, lr: f32) -> Self {
        self.learning_rate = lr;
        self
    }
}

impl Default for GradientBoosting {
    fn default() -> Self {
        Self::new()
    }
}

impl Model for GradientBoosting {
    fn fit(&mut self, x: &[Vec<f32>], y: &[usize]) -> Result<()> {
        check_training_input(x, y)?;
        let mut booster = GradientBoostingClassifier::new()
            .with_n_estimators(self.n_estimators)
            .with_learning_rate(self.learning_rate)
            .with_max_depth(self.max_depth);
        booster.fit(&to_matrix(x)?, y).map_err(training_error)?;
        self.booster = Some(booster);
        Ok(())
    }

    fn predict_proba(&self, x: &[Vec<f32>]) -> Result<Vec<f64>> {
        let booster = self.booster.as_ref().ok_or_else(|| not_fitted("GradientBoosting"))?;
        let proba = booster.predict_proba(&to_matrix(x)?).map_err(training_error)?;
        Ok(proba
            .iter()
            .map(|classes| classes.get(WEED).copied().map_or(0.0, f64::from))
            .collect())
    }
}
