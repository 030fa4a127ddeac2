//! Multi-layer perceptron with one tanh hidden layer and a sigmoid output.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{check_training_input, not_fitted, Model};
use crate::dataset::WEED;
use crate::linalg::{column_stats, sigmoid, standardize};
use crate::Result;

/// One-hidden-layer perceptron trained by full-batch gradient descent on
/// log-loss.
#[derive(Debug, Clone)]
pub struct Mlp {
    hidden: usize,
    learning_rate: f64,
    epochs: usize,
    random_state: u64,
    fitted: Option<Network>,
}

#[derive(Debug, Clone)]
struct Network {
    mean: Vec<f32>,
    std: Vec<f32>,
    /// `hidden × inputs`
    w1: Vec<Vec<f64>>,
    b1: Vec<f64>,
    w2: Vec<f64>,
    b2: f64,
}

impl Network {
    fn hidden(&self, z: &[f32]) -> Vec<f64> {
        self.w1
            .iter()
            .zip(&self.b1)
            .map(|(weights, bias)| {
                let a: f64 = weights.iter().zip(z).map(|(w, v)| w * f64::from(*v)).sum();
                (a + bias).tanh()
            })
            .collect()
    }

    fn output(&self, h: &[f64]) -> f64 {
        sigmoid(self.w2.iter().zip(h).map(|(w, v)| w * v).sum::<f64>() + self.b2)
    }
}

impl Mlp {
    /// Creates a perceptron with `hidden` units (learning rate 0.5, 300 epochs).
    #[must_use]
    pub const fn new(hidden: usize) -> Self {
        Self {
            hidden,
            learning_rate: 0.5,
            epochs: 300,
            random_state: 0,
            fitted: None,
        }
    }

    /// Sets the number of training epochs.
    #[must_use]
    pub const fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// Sets the seed for weight initialization.
    #[must_use]
    pub const fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }
}

impl Model for Mlp {
    #[allow(clippy::cast_precision_loss)]
    fn fit(&mut self, x: &[Vec<f32>], y: &[usize]) -> Result<()> {
        check_training_input(x, y)?;
        let (mean, std) = column_stats(x);
        let z: Vec<Vec<f32>> = x.iter().map(|row| standardize(row, &mean, &std)).collect();
        let inputs = mean.len();
        let hidden = self.hidden.max(1);
        let n = x.len() as f64;

        // Xavier-uniform initialization
        let mut rng = StdRng::seed_from_u64(self.random_state);
        let limit1 = (6.0 / (inputs + hidden) as f64).sqrt();
        let limit2 = (6.0 / (hidden + 1) as f64).sqrt();
        let mut net = Network {
            mean,
            std,
            w1: (0..hidden)
                .map(|_| (0..inputs).map(|_| rng.gen_range(-limit1..limit1)).collect())
                .collect(),
            b1: vec![0.0; hidden],
            w2: (0..hidden).map(|_| rng.gen_range(-limit2..limit2)).collect(),
            b2: 0.0,
        };

        for _ in 0..self.epochs {
            let mut g_w1 = vec![vec![0.0f64; inputs]; hidden];
            let mut g_b1 = vec![0.0f64; hidden];
            let mut g_w2 = vec![0.0f64; hidden];
            let mut g_b2 = 0.0f64;

            for (row, &label) in z.iter().zip(y) {
                let h = net.hidden(row);
                let delta_out = net.output(&h) - f64::from(u8::from(label == WEED));
                g_b2 += delta_out;
                for j in 0..hidden {
                    g_w2[j] += delta_out * h[j];
                    let delta_hidden = delta_out * net.w2[j] * (1.0 - h[j] * h[j]);
                    g_b1[j] += delta_hidden;
                    for (g, v) in g_w1[j].iter_mut().zip(row) {
                        *g += delta_hidden * f64::from(*v);
                    }
                }
            }

            let step = self.learning_rate / n;
            net.b2 -= step * g_b2;
            for j in 0..hidden {
                net.w2[j] -= step * g_w2[j];
                net.b1[j] -= step * g_b1[j];
                for (w, g) in net.w1[j].iter_mut().zip(&g_w1[j]) {
                    *w -= step * g;
                }
            }
        }

        self.fitted = Some(net);
        Ok(())
    }

    fn predict_proba(&self, x: &[Vec<f32>]) -> Result<Vec<f64>> {
        let net = self.fitted.as_ref().ok_or_else(|| not_fitted("Mlp"))?;
        Ok(x.iter()
            .map(|row| net.output(&net.hidden(&standardize(row, &net.mean, &net.std))))
            .collect())
    }
}
