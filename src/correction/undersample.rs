//! Undersampling and cleaning: random majority removal, Tomek links and
//! edited nearest neighbours.

use rand::seq::SliceRandom;
use rand::Rng;

use super::minority_majority;
use crate::dataset::Dataset;
use crate::linalg::nearest;

/// Drop random majority rows until both classes match.
pub(super) fn random<R: Rng + ?Sized>(data: &Dataset, rng: &mut R) -> Dataset {
    let (minority, majority) = minority_majority(data);
    let mut keep = data.indices_of(minority);
    let mut pool = data.indices_of(majority);
    pool.shuffle(rng);
    pool.truncate(keep.len());
    keep.extend(pool);
    keep.sort_unstable();
    data.subset(&keep)
}

/// Remove Tomek links: pairs of opposite-class rows that are each other's
/// nearest neighbour. Only the majority row is removed unless `both`.
pub(super) fn tomek_links(data: &Dataset, both: bool) -> Dataset {
    let (_, majority) = minority_majority(data);
    let everyone: Vec<usize> = (0..data.len()).collect();
    let nearest_of: Vec<Option<usize>> = everyone
        .iter()
        .map(|&i| nearest(&data.rows()[i], data.rows(), &everyone, 1, Some(i)).first().copied())
        .collect();

    let labels = data.labels();
    let keep: Vec<usize> = everyone
        .iter()
        .copied()
        .filter(|&i| {
            let linked = nearest_of[i].is_some_and(|j| {
                labels[j] != labels[i] && nearest_of[j] == Some(i)
            });
            !(linked && (both || labels[i] == majority))
        })
        .collect();
    data.subset(&keep)
}

/// Edited nearest neighbours: remove a row unless all of its `k` neighbours
/// share its label. Only majority rows are candidates unless `all_classes`.
pub(super) fn edited_nearest_neighbours(data: &Dataset, k: usize, all_classes: bool) -> Dataset {
    let (_, majority) = minority_majority(data);
    let everyone: Vec<usize> = (0..data.len()).collect();
    let labels = data.labels();

    let keep: Vec<usize> = everyone
        .iter()
        .copied()
        .filter(|&i| {
            if !all_classes && labels[i] != majority {
                return true;
            }
            let neighbours = nearest(&data.rows()[i], data.rows(), &everyone, k, Some(i));
            neighbours.iter().all(|&n| labels[n] == labels[i])
        })
        .collect();
    data.subset(&keep)
}
