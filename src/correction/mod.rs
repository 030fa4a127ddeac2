//! Imbalance correction techniques
//!
//! Each [`ImbalanceCorrection`] rebalances a [`Dataset`] towards class
//! parity, either by synthesizing minority rows, by removing majority rows,
//! or both:
//!
//! | Family | Techniques |
//! |---|---|
//! | Oversampling | `RANDOM`, `SMOTE`, `ADASYN`, `BORDERLINE` |
//! | Undersampling | `UNDERSAMPLE`, `TOMEK`, `ENN` |
//! | Combined | `SMOTEENN`, `SMOTETOMEK` |
//!
//! ## Example
//!
//! ```rust
//! use rand::SeedableRng;
//! use trueno_imbalance::correction::ImbalanceCorrection;
//! use trueno_imbalance::dataset::Dataset;
//!
//! let rows = vec![vec![0.0], vec![0.1], vec![0.2], vec![0.3], vec![1.0], vec![1.1]];
//! let data = Dataset::new(vec!["x".into()], rows, vec![0, 0, 0, 0, 1, 1])?;
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//!
//! let balanced = ImbalanceCorrection::Smote.resample(&data, &mut rng)?;
//! assert_eq!(balanced.class_counts(), (4, 4));
//! # Ok::<(), trueno_imbalance::Error>(())
//! ```

mod oversample;
mod undersample;

use std::fmt;
use std::str::FromStr;

use rand::Rng;

use crate::dataset::{Dataset, CROP, WEED};
use crate::{Error, Result};

/// Neighbours considered by the SMOTE family.
pub const SMOTE_NEIGHBOURS: usize = 5;

/// Neighbours considered by edited nearest neighbours.
pub const ENN_NEIGHBOURS: usize = 3;

/// How a technique changes the class balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrectionFamily {
    /// Adds minority rows.
    Oversampling,
    /// Removes majority rows.
    Undersampling,
    /// Oversamples, then cleans.
    Combined,
}

/// Imbalance correction technique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImbalanceCorrection {
    /// Duplicate random minority rows.
    Random,
    /// Synthetic Minority Oversampling Technique.
    Smote,
    /// Adaptive synthetic sampling: more synthesis where minority rows are hard to learn.
    Adasyn,
    /// SMOTE seeded only from minority rows on the class border.
    Borderline,
    /// Drop random majority rows.
    Undersample,
    /// Drop majority rows that form Tomek links.
    Tomek,
    /// Drop majority rows misclassified by their neighbours.
    Enn,
    /// SMOTE followed by edited nearest neighbours on both classes.
    SmoteEnn,
    /// SMOTE followed by removal of both rows of every Tomek link.
    SmoteTomek,
}

impl ImbalanceCorrection {
    /// Every technique, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Random,
        Self::Smote,
        Self::Adasyn,
        Self::Borderline,
        Self::Undersample,
        Self::Tomek,
        Self::Enn,
        Self::SmoteEnn,
        Self::SmoteTomek,
    ];

    /// Canonical upper-case name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Random => "RANDOM",
            Self::Smote => "SMOTE",
            Self::Adasyn => "ADASYN",
            Self::Borderline => "BORDERLINE",
            Self::Undersample => "UNDERSAMPLE",
            Self::Tomek => "TOMEK",
            Self::Enn => "ENN",
            Self::SmoteEnn => "SMOTEENN",
            Self::SmoteTomek => "SMOTETOMEK",
        }
    }

    /// Family this technique belongs to.
    #[must_use]
    pub const fn family(self) -> CorrectionFamily {
        match self {
            Self::Random | Self::Smote | Self::Adasyn | Self::Borderline => {
                CorrectionFamily::Oversampling
            }
            Self::Undersample | Self::Tomek | Self::Enn => CorrectionFamily::Undersampling,
            Self::SmoteEnn | Self::SmoteTomek => CorrectionFamily::Combined,
        }
    }

    /// All techniques of one family.
    #[must_use]
    pub fn of_family(family: CorrectionFamily) -> Vec<Self> {
        Self::ALL.into_iter().filter(|c| c.family() == family).collect()
    }

    /// Rebalance `data`.
    ///
    /// A dataset that is already balanced is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Dataset`] if one class is missing, or too few
    /// minority rows exist to interpolate between.
    pub fn resample<R: Rng + ?Sized>(self, data: &Dataset, rng: &mut R) -> Result<Dataset> {
        let (n_crop, n_weed) = data.class_counts();
        if n_crop == 0 || n_weed == 0 {
            return Err(Error::Dataset(format!(
                "{} needs both classes, found {n_crop} crop and {n_weed} weed rows",
                self.name()
            )));
        }
        if n_crop == n_weed {
            return Ok(data.clone());
        }

        match self {
            Self::Random => Ok(oversample::random(data, rng)),
            Self::Smote => oversample::smote(data, SMOTE_NEIGHBOURS, rng),
            Self::Adasyn => oversample::adasyn(data, SMOTE_NEIGHBOURS, rng),
            Self::Borderline => oversample::borderline(data, SMOTE_NEIGHBOURS, rng),
            Self::Undersample => Ok(undersample::random(data, rng)),
            Self::Tomek => Ok(undersample::tomek_links(data, false)),
            Self::Enn => Ok(undersample::edited_nearest_neighbours(data, ENN_NEIGHBOURS, false)),
            Self::SmoteEnn => {
                let synthetic = oversample::smote(data, SMOTE_NEIGHBOURS, rng)?;
                Ok(undersample::edited_nearest_neighbours(&synthetic, ENN_NEIGHBOURS, true))
            }
            Self::SmoteTomek => {
                let synthetic = oversample::smote(data, SMOTE_NEIGHBOURS, rng)?;
                Ok(undersample::tomek_links(&synthetic, true))
            }
        }
    }
}

impl fmt::Display for ImbalanceCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ImbalanceCorrection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownCorrection(s.to_string()))
    }
}

/// `(minority, majority)` class labels; ties resolve to weed as the minority.
pub(crate) fn minority_majority(data: &Dataset) -> (usize, usize) {
    let (n_crop, n_weed) = data.class_counts();
    if n_crop < n_weed {
        (CROP, WEED)
    } else {
        (WEED, CROP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    pub(crate) fn imbalanced() -> Dataset {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..20 {
            rows.push(vec![i as f32 * 0.1, (i % 5) as f32 * 0.1]);
            labels.push(CROP);
        }
        for i in 0..5 {
            rows.push(vec![3.0 + i as f32 * 0.1, 3.0 + i as f32 * 0.05]);
            labels.push(WEED);
        }
        Dataset::new(vec!["x".into(), "y".into()], rows, labels).unwrap()
    }

    #[test]
    fn test_families_partition_all() {
        let over = ImbalanceCorrection::of_family(CorrectionFamily::Oversampling);
        let under = ImbalanceCorrection::of_family(CorrectionFamily::Undersampling);
        let combined = ImbalanceCorrection::of_family(CorrectionFamily::Combined);
        assert_eq!(over.len() + under.len() + combined.len(), ImbalanceCorrection::ALL.len());
        assert_eq!(
            combined,
            vec![ImbalanceCorrection::SmoteEnn, ImbalanceCorrection::SmoteTomek]
        );
    }

    #[test]
    fn test_from_str_case_insensitive() {
        assert_eq!("smote".parse::<ImbalanceCorrection>().unwrap(), ImbalanceCorrection::Smote);
        assert_eq!("SmoteTomek".parse::<ImbalanceCorrection>().unwrap(), ImbalanceCorrection::SmoteTomek);
        assert!(matches!(
            "bogus".parse::<ImbalanceCorrection>(),
            Err(Error::UnknownCorrection(_))
        ));
    }

    #[test]
    fn test_oversampling_reaches_parity() {
        let data = imbalanced();
        for technique in [ImbalanceCorrection::Random, ImbalanceCorrection::Smote, ImbalanceCorrection::Borderline] {
            let mut rng = StdRng::seed_from_u64(3);
            let out = technique.resample(&data, &mut rng).unwrap();
            assert_eq!(out.class_counts(), (20, 20), "{technique}");
        }
    }

    #[test]
    fn test_undersample_reaches_parity() {
        let mut rng = StdRng::seed_from_u64(3);
        let out = ImbalanceCorrection::Undersample.resample(&imbalanced(), &mut rng).unwrap();
        assert_eq!(out.class_counts(), (5, 5));
    }

    #[test]
    fn test_single_class_rejected() {
        let data = Dataset::new(vec!["x".into()], vec![vec![0.0], vec![1.0]], vec![0, 0]).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        assert!(ImbalanceCorrection::Smote.resample(&data, &mut rng).is_err());
    }

    #[test]
    fn test_balanced_unchanged() {
        let data = Dataset::new(vec!["x".into()], vec![vec![0.0], vec![1.0]], vec![0, 1]).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(ImbalanceCorrection::Adasyn.resample(&data, &mut rng).unwrap(), data);
    }
}
