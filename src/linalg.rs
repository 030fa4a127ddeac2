//! Vector kernels shared by the models and resamplers.
//!
//! Dot products and distances go through trueno's SIMD `Vector`; a scalar
//! loop is used when trueno rejects the input (length mismatch).

use trueno::Vector;

/// Dot product of two equal-length slices.
#[must_use]
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    Vector::from_slice(a)
        .dot(&Vector::from_slice(b))
        .unwrap_or_else(|_| a.iter().zip(b).map(|(x, y)| x * y).sum())
}

/// Squared Euclidean distance.
#[must_use]
pub fn squared_distance(a: &[f32], b: &[f32]) -> f32 {
    let va = Vector::from_slice(a);
    let vb = Vector::from_slice(b);
    va.sub(&vb)
        .and_then(|diff| diff.dot(&diff))
        .unwrap_or_else(|_| a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum())
}

/// Indices of the `k` rows in `candidates` nearest to `point`, closest first.
///
/// `skip` excludes one row index (the query itself when it is a member).
#[must_use]
pub fn nearest(point: &[f32], rows: &[Vec<f32>], candidates: &[usize], k: usize, skip: Option<usize>) -> Vec<usize> {
    let mut distances: Vec<(f32, usize)> = candidates
        .iter()
        .filter(|&&i| Some(i) != skip)
        .map(|&i| (squared_distance(point, &rows[i]), i))
        .collect();
    distances.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    distances.into_iter().take(k).map(|(_, i)| i).collect()
}

/// Per-column mean and standard deviation (population), with zero deviations replaced by 1.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn column_stats(rows: &[Vec<f32>]) -> (Vec<f32>, Vec<f32>) {
    let width = rows.first().map_or(0, Vec::len);
    let n = rows.len().max(1) as f32;
    let mut mean = vec![0.0; width];
    for row in rows {
        for (m, v) in mean.iter_mut().zip(row) {
            *m += v / n;
        }
    }
    let mut std = vec![0.0f32; width];
    for row in rows {
        for ((s, v), m) in std.iter_mut().zip(row).zip(&mean) {
            *s += (v - m) * (v - m) / n;
        }
    }
    for s in &mut std {
        *s = if *s > f32::EPSILON { s.sqrt() } else { 1.0 };
    }
    (mean, std)
}

/// Standardize one row with precomputed column statistics.
#[must_use]
pub fn standardize(row: &[f32], mean: &[f32], std: &[f32]) -> Vec<f32> {
    row.iter()
        .zip(mean)
        .zip(std)
        .map(|((v, m), s)| (v - m) / s)
        .collect()
}

/// Logistic sigmoid.
#[must_use]
pub fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
