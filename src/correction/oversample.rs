//! Oversampling: random duplication and the SMOTE family.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;

use super::minority_majority;
use crate::dataset::Dataset;
use crate::linalg::nearest;
use crate::{Error, Result};

/// Duplicate random minority rows until both classes match.
pub(super) fn random<R: Rng + ?Sized>(data: &Dataset, rng: &mut R) -> Dataset {
    let (minority, majority) = minority_majority(data);
    let pool = data.indices_of(minority);
    let need = data.indices_of(majority).len() - pool.len();

    let rows = (0..need)
        .filter_map(|_| pool.choose(rng))
        .map(|&i| data.rows()[i].clone())
        .collect();
    data.extended(rows, vec![minority; need])
}

/// Synthesize minority rows uniformly from every minority row.
pub(super) fn smote<R: Rng + ?Sized>(data: &Dataset, k: usize, rng: &mut R) -> Result<Dataset> {
    let (minority, majority) = minority_majority(data);
    let pool = data.indices_of(minority);
    let need = data.indices_of(majority).len() - pool.len();

    let seeds: Vec<usize> = (0..need).filter_map(|_| pool.choose(rng).copied()).collect();
    interpolate(data, minority, &pool, &seeds, k, rng)
}

/// ADASYN: each minority row seeds synthetic rows in proportion to how many
/// majority rows surround it.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(super) fn adasyn<R: Rng + ?Sized>(data: &Dataset, k: usize, rng: &mut R) -> Result<Dataset> {
    let (minority, majority) = minority_majority(data);
    let pool = data.indices_of(minority);
    let need = data.indices_of(majority).len() - pool.len();
    let everyone: Vec<usize> = (0..data.len()).collect();

    let hardness: Vec<f64> = pool
        .iter()
        .map(|&i| {
            let neighbours = nearest(&data.rows()[i], data.rows(), &everyone, k, Some(i));
            let hostile = neighbours
                .iter()
                .filter(|&&n| data.labels()[n] == majority)
                .count();
            hostile as f64 / k as f64
        })
        .collect();

    let total: f64 = hardness.iter().sum();
    if total <= 0.0 {
        // No minority row has a majority neighbour: nothing is harder than anything else
        return smote(data, k, rng);
    }

    let mut seeds = Vec::with_capacity(need);
    for (&i, h) in pool.iter().zip(&hardness) {
        let count = (h / total * need as f64).round() as usize;
        seeds.extend(std::iter::repeat(i).take(count));
    }
    // Rounding can miss or overshoot parity by a few rows
    seeds.shuffle(rng);
    seeds.truncate(need);
    while seeds.len() < need {
        if let Some(&i) = pool.choose(rng) {
            seeds.push(i);
        }
    }

    interpolate(data, minority, &pool, &seeds, k, rng)
}

/// Borderline-SMOTE: only minority rows whose neighbourhood is at least
/// half (but not entirely) majority seed synthetic rows.
pub(super) fn borderline<R: Rng + ?Sized>(data: &Dataset, k: usize, rng: &mut R) -> Result<Dataset> {
    let (minority, majority) = minority_majority(data);
    let pool = data.indices_of(minority);
    let need = data.indices_of(majority).len() - pool.len();
    let everyone: Vec<usize> = (0..data.len()).collect();

    let danger: Vec<usize> = pool
        .iter()
        .copied()
        .filter(|&i| {
            let neighbours = nearest(&data.rows()[i], data.rows(), &everyone, k, Some(i));
            let hostile = neighbours
                .iter()
                .filter(|&&n| data.labels()[n] == majority)
                .count();
            2 * hostile >= neighbours.len() && hostile < neighbours.len()
        })
        .collect();

    if danger.is_empty() {
        return smote(data, k, rng);
    }

    let seeds: Vec<usize> = (0..need).filter_map(|_| danger.choose(rng).copied()).collect();
    interpolate(data, minority, &pool, &seeds, k, rng)
}

/// One synthetic row per seed, placed at a random point on the segment
/// between the seed and one of its `k` nearest minority neighbours.
fn interpolate<R: Rng + ?Sized>(
    data: &Dataset,
    minority: usize,
    pool: &[usize],
    seeds: &[usize],
    k: usize,
    rng: &mut R,
) -> Result<Dataset> {
    if pool.len() < 2 {
        return Err(Error::Dataset(format!(
            "interpolation needs at least 2 minority rows, found {}",
            pool.len()
        )));
    }
    let k = k.min(pool.len() - 1);

    let mut neighbourhoods: HashMap<usize, Vec<usize>> = HashMap::new();
    let mut rows = Vec::with_capacity(seeds.len());
    for &seed in seeds {
        let neighbours = neighbourhoods
            .entry(seed)
            .or_insert_with(|| nearest(&data.rows()[seed], data.rows(), pool, k, Some(seed)));
        let Some(&partner) = neighbours.choose(rng) else {
            continue;
        };

        let origin = &data.rows()[seed];
        let target = &data.rows()[partner];
        let gap: f32 = rng.gen();
        rows.push(
            origin
                .iter()
                .zip(target)
                .map(|(a, b)| a + gap * (b - a))
                .collect(),
        );
    }

    let labels = vec![minority; rows.len()];
    Ok(data.extended(rows, labels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correction::tests::imbalanced;
    use crate::dataset::WEED;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_smote_rows_lie_within_minority_hull() {
        let data = imbalanced();
        let mut rng = StdRng::seed_from_u64(11);
        let out = smote(&data, 5, &mut rng).unwrap();

        for (row, &label) in out.rows().iter().zip(out.labels()).skip(data.len()) {
            assert_eq!(label, WEED);
            assert!(row[0] >= 3.0 - 1e-5 && row[0] <= 3.4 + 1e-5);
            assert!(row[1] >= 3.0 - 1e-5 && row[1] <= 3.2 + 1e-5);
        }
    }

    #[test]
    fn test_smote_keeps_original_rows_first() {
        let data = imbalanced();
        let mut rng = StdRng::seed_from_u64(11);
        let out = smote(&data, 5, &mut rng).unwrap();
        assert_eq!(&out.rows()[..data.len()], data.rows());
    }

    #[test]
    fn test_smote_needs_two_minority_rows() {
        let data = Dataset::new(
            vec!["x".into()],
            vec![vec![0.0], vec![0.1], vec![5.0]],
            vec![0, 0, 1],
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        assert!(smote(&data, 5, &mut rng).is_err());
        // Random duplication has no such requirement
        assert_eq!(random(&data, &mut rng).class_counts(), (2, 2));
    }

    #[test]
    fn test_adasyn_reaches_parity_with_overlap() {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..30 {
            rows.push(vec![i as f32 * 0.1]);
            labels.push(0);
        }
        for i in 0..6 {
            rows.push(vec![1.0 + i as f32 * 0.35]);
            labels.push(1);
        }
        let data = Dataset::new(vec!["x".into()], rows, labels).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let out = adasyn(&data, 5, &mut rng).unwrap();
        assert_eq!(out.class_counts(), (30, 30));
    }
}
