//! Labelled tabular datasets
//!
//! A [`Dataset`] is a dense feature matrix (row-major `f32`) with one binary
//! label per row: `0` is the crop (majority) class, `1` the weed (minority,
//! positive) class.
//!
//! Datasets are immutable values: every operation (feature selection,
//! ratio subsampling, splitting, resampling) returns a new dataset.

mod loader;

use std::path::Path;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::{Error, Result};

/// Crop (majority) class label
pub const CROP: usize = 0;

/// Weed (minority, positive) class label
pub const WEED: usize = 1;

/// Fraction of rows held out for assessment
pub const TEST_FRACTION: f64 = 0.3;

/// Dense labelled dataset
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    feature_names: Vec<String>,
    rows: Vec<Vec<f32>>,
    labels: Vec<usize>,
}

impl Dataset {
    /// Create a dataset, validating shape and labels.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Dataset`] if row widths differ from the feature count,
    /// row and label counts differ, or a label is not 0 or 1.
    pub fn new(feature_names: Vec<String>, rows: Vec<Vec<f32>>, labels: Vec<usize>) -> Result<Self> {
        if rows.len() != labels.len() {
            return Err(Error::Dataset(format!(
                "{} rows but {} labels",
                rows.len(),
                labels.len()
            )));
        }
        if let Some(row) = rows.iter().find(|r| r.len() != feature_names.len()) {
            return Err(Error::Dataset(format!(
                "row has {} values, expected {}",
                row.len(),
                feature_names.len()
            )));
        }
        if let Some(label) = labels.iter().find(|&&l| l != CROP && l != WEED) {
            return Err(Error::Dataset(format!("label {label} is not 0 or 1")));
        }
        Ok(Self {
            feature_names,
            rows,
            labels,
        })
    }

    /// Load a dataset from CSV or Parquet (chosen by file extension).
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or the label column is
    /// missing or not binary.
    pub fn load(path: impl AsRef<Path>, label_column: &str) -> Result<Self> {
        let path = path.as_ref();
        let is_parquet = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("parquet"));
        if is_parquet {
            loader::load_parquet(path, label_column)
        } else {
            loader::load_csv(path, label_column)
        }
    }

    /// Feature column names.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Feature rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<f32>] {
        &self.rows
    }

    /// Class labels.
    #[must_use]
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the dataset has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of feature columns.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Row counts as `(crop, weed)`.
    #[must_use]
    pub fn class_counts(&self) -> (usize, usize) {
        let weeds = self.labels.iter().filter(|&&l| l == WEED).count();
        (self.labels.len() - weeds, weeds)
    }

    /// Indices of rows carrying `label`.
    #[must_use]
    pub fn indices_of(&self, label: usize) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, &l)| l == label)
            .map(|(i, _)| i)
            .collect()
    }

    /// Keep only the named feature columns, in the given order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Dataset`] naming the first column that does not exist.
    pub fn select(&self, names: &[String]) -> Result<Self> {
        let columns = names
            .iter()
            .map(|name| {
                self.feature_names
                    .iter()
                    .position(|f| f == name)
                    .ok_or_else(|| Error::Dataset(format!("no feature column named '{name}'")))
            })
            .collect::<Result<Vec<usize>>>()?;

        let rows = self
            .rows
            .iter()
            .map(|row| columns.iter().map(|&c| row[c]).collect())
            .collect();

        Ok(Self {
            feature_names: names.to_vec(),
            rows,
            labels: self.labels.clone(),
        })
    }

    /// Rows at `indices`, in that order.
    #[must_use]
    pub fn subset(&self, indices: &[usize]) -> Self {
        Self {
            feature_names: self.feature_names.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
        }
    }

    /// This dataset followed by extra rows.
    #[must_use]
    pub fn extended(&self, rows: Vec<Vec<f32>>, labels: Vec<usize>) -> Self {
        let mut out = self.clone();
        out.rows.extend(rows);
        out.labels.extend(labels);
        out
    }

    /// Concatenate two datasets with the same columns.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Dataset`] if the feature columns differ.
    pub fn concat(&self, other: &Self) -> Result<Self> {
        if self.feature_names != other.feature_names {
            return Err(Error::Dataset("cannot concatenate datasets with different columns".to_string()));
        }
        Ok(self.extended(other.rows.clone(), other.labels.clone()))
    }

    /// Randomly drop rows so that crop:weed matches the desired ratio.
    ///
    /// The largest subset with the exact ratio is kept. A zero on either
    /// side keeps the dataset's natural ratio.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Dataset`] if the ratio leaves one class empty.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn subsample_to_ratio<R: Rng + ?Sized>(&self, crop: f64, weed: f64, rng: &mut R) -> Result<Self> {
        if crop <= 0.0 || weed <= 0.0 {
            return Ok(self.clone());
        }

        let (n_crop, n_weed) = self.class_counts();
        let scale = (n_crop as f64 / crop).min(n_weed as f64 / weed);
        let keep_crop = (scale * crop).floor() as usize;
        let keep_weed = (scale * weed).floor() as usize;
        if keep_crop == 0 || keep_weed == 0 {
            return Err(Error::Dataset(format!(
                "ratio {crop}:{weed} cannot be met with {n_crop} crop and {n_weed} weed rows"
            )));
        }

        let mut crop_idx = self.indices_of(CROP);
        let mut weed_idx = self.indices_of(WEED);
        crop_idx.shuffle(rng);
        weed_idx.shuffle(rng);
        crop_idx.truncate(keep_crop);
        weed_idx.truncate(keep_weed);

        let mut keep: Vec<usize> = crop_idx.into_iter().chain(weed_idx).collect();
        keep.sort_unstable();
        Ok(self.subset(&keep))
    }

    /// Split into `(train, test)` with `test_fraction` of rows held out.
    ///
    /// When `stratify` is set each class is split separately so both
    /// halves keep the class proportions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Dataset`] if either half would be empty.
    pub fn train_test_split<R: Rng + ?Sized>(
        &self,
        test_fraction: f64,
        stratify: bool,
        rng: &mut R,
    ) -> Result<(Self, Self)> {
        let groups = if stratify {
            vec![self.indices_of(CROP), self.indices_of(WEED)]
        } else {
            vec![(0..self.len()).collect()]
        };

        let mut train = Vec::new();
        let mut test = Vec::new();
        for mut group in groups {
            group.shuffle(rng);
            let n_test = test_count(group.len(), test_fraction);
            test.extend_from_slice(&group[..n_test]);
            train.extend_from_slice(&group[n_test..]);
        }

        if train.is_empty() || test.is_empty() {
            return Err(Error::Dataset(format!(
                "cannot split {} rows into train and test sets",
                self.len()
            )));
        }

        train.sort_unstable();
        test.sort_unstable();
        Ok((self.subset(&train), self.subset(&test)))
    }

    /// Write the dataset as CSV: feature columns, then the label column.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written.
    pub fn write_csv(&self, path: impl AsRef<Path>, label_column: &str) -> Result<()> {
        let mut writer = csv::Writer::from_path(path.as_ref())?;
        let mut header: Vec<&str> = self.feature_names.iter().map(String::as_str).collect();
        header.push(label_column);
        writer.write_record(&header)?;

        for (row, label) in self.rows.iter().zip(&self.labels) {
            let mut record: Vec<String> = row.iter().map(f32::to_string).collect();
            record.push(label.to_string());
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn test_count(n: usize, fraction: f64) -> usize {
    ((n as f64 * fraction).ceil() as usize).min(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample(n_crop: usize, n_weed: usize) -> Dataset {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..n_crop {
            rows.push(vec![i as f32, 0.0]);
            labels.push(CROP);
        }
        for i in 0..n_weed {
            rows.push(vec![i as f32, 1.0]);
            labels.push(WEED);
        }
        Dataset::new(vec!["a".into(), "b".into()], rows, labels).unwrap()
    }

    #[test]
    fn test_new_rejects_non_binary_labels() {
        let err = Dataset::new(vec!["a".into()], vec![vec![1.0]], vec![2]).unwrap_err();
        assert!(err.to_string().contains("not 0 or 1"));
    }

    #[test]
    fn test_new_rejects_ragged_rows() {
        assert!(Dataset::new(vec!["a".into()], vec![vec![1.0, 2.0]], vec![0]).is_err());
    }

    #[test]
    fn test_select_reorders_columns() {
        let data = sample(2, 1);
        let selected = data.select(&["b".to_string(), "a".to_string()]).unwrap();
        assert_eq!(selected.feature_names(), &["b".to_string(), "a".to_string()]);
        assert_eq!(selected.rows()[2], vec![1.0, 0.0]);
    }

    #[test]
    fn test_select_missing_column() {
        let err = sample(2, 1).select(&["missing".to_string()]).unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_subsample_to_ratio() {
        let mut rng = StdRng::seed_from_u64(7);
        let data = sample(100, 40);
        let sub = data.subsample_to_ratio(10.0, 2.0, &mut rng).unwrap();
        assert_eq!(sub.class_counts(), (100, 20));

        let sub = data.subsample_to_ratio(1.0, 1.0, &mut rng).unwrap();
        assert_eq!(sub.class_counts(), (40, 40));
    }

    #[test]
    fn test_subsample_zero_keeps_natural_ratio() {
        let mut rng = StdRng::seed_from_u64(7);
        let data = sample(10, 3);
        assert_eq!(data.subsample_to_ratio(0.0, 0.0, &mut rng).unwrap(), data);
    }

    #[test]
    fn test_stratified_split_keeps_both_classes() {
        let mut rng = StdRng::seed_from_u64(1);
        let (train, test) = sample(20, 10).train_test_split(0.3, true, &mut rng).unwrap();
        assert_eq!(train.class_counts(), (14, 7));
        assert_eq!(test.class_counts(), (6, 3));
    }

    #[test]
    fn test_split_too_small() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(sample(1, 0).train_test_split(0.3, false, &mut rng).is_err());
    }

    #[test]
    fn test_write_csv_round_trips_through_loader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let data = sample(3, 2);
        data.write_csv(&path, "type").unwrap();
        let loaded = Dataset::load(&path, "type").unwrap();
        assert_eq!(loaded, data);
    }
}
