//! Result Store - in-memory accumulation of one sweep's outcomes
//!
//! Baseline rows are keyed by `"<classification>-<ratio>"` so each corrected
//! row can be compared with the uncorrected run that shares its classifier
//! and ratio.

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use super::{BaselineRecord, ResultRecord, RocPlot, RocSeries, RunOutcome};
use crate::{Error, Result};

/// In-memory store for sweep results.
///
/// ## Design
///
/// Rows are append-only. ROC series are kept in first-recorded order and
/// replaced in place when a later run reports the same display name, so the
/// chart shows the last curve recorded for each classifier.
#[derive(Debug, Default)]
pub struct ResultStore {
    baselines: HashMap<String, BaselineRecord>,
    uncorrected: Vec<BaselineRecord>,
    corrected: Vec<ResultRecord>,
    roc: Vec<RocSeries>,
}

/// Baseline lookup key for a classification technique and ratio label.
#[must_use]
pub fn baseline_key(classification: &str, ratio: &str) -> String {
    format!("{classification}-{ratio}")
}

impl ResultStore {
    /// Create a new empty result store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.uncorrected.is_empty() && self.corrected.is_empty()
    }

    /// Record the outcome of one run.
    ///
    /// Uncorrected outcomes become baselines. Corrected outcomes are
    /// appended with deltas against the baseline sharing
    /// `(classification, ratio)`. Either way the ROC series for the run's
    /// display name is recorded or replaced.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingBaseline`] if a corrected outcome arrives
    /// before its baseline.
    pub fn record_result(
        &mut self,
        classification: &str,
        correction: &str,
        ratio: &str,
        outcome: &RunOutcome,
        corrected: bool,
    ) -> Result<()> {
        let key = baseline_key(classification, ratio);
        let metrics = &outcome.metrics;

        if corrected {
            let baseline = self
                .baselines
                .get(&key)
                .ok_or_else(|| Error::MissingBaseline(key.clone()))?;
            let row = ResultRecord::against_baseline(
                self.corrected.len(),
                correction,
                metrics.auc,
                metrics.f1,
                metrics.fpr.clone(),
                metrics.score,
                baseline,
            );
            self.corrected.push(row);
        } else {
            let row = BaselineRecord::new(
                self.uncorrected.len(),
                classification,
                ratio,
                metrics.auc,
                metrics.f1,
                metrics.fpr.clone(),
                metrics.score,
            );
            self.baselines.insert(key, row.clone());
            self.uncorrected.push(row);
        }

        let series = RocSeries::new(&outcome.name, metrics.fpr.clone(), metrics.tpr.clone());
        match self.roc.iter_mut().find(|s| s.name() == outcome.name) {
            Some(existing) => *existing = series,
            None => self.roc.push(series),
        }
        Ok(())
    }

    /// Get the baseline for a classification technique and ratio label.
    #[must_use]
    pub fn baseline(&self, classification: &str, ratio: &str) -> Option<&BaselineRecord> {
        self.baselines.get(&baseline_key(classification, ratio))
    }

    /// Uncorrected rows in recording order.
    #[must_use]
    pub fn uncorrected(&self) -> &[BaselineRecord] {
        &self.uncorrected
    }

    /// Corrected rows in recording order.
    #[must_use]
    pub fn corrected(&self) -> &[ResultRecord] {
        &self.corrected
    }

    /// ROC series in first-recorded order.
    #[must_use]
    pub fn roc_series(&self) -> &[RocSeries] {
        &self.roc
    }

    /// Write both tables as CSV.
    ///
    /// # Errors
    ///
    /// Returns error if either file cannot be created or written.
    pub fn export_tables(
        &self,
        corrected_path: impl AsRef<Path>,
        uncorrected_path: impl AsRef<Path>,
    ) -> Result<()> {
        write_rows(corrected_path.as_ref(), &self.corrected, CORRECTED_HEADER)?;
        write_rows(uncorrected_path.as_ref(), &self.uncorrected, UNCORRECTED_HEADER)?;
        info!(
            corrected = self.corrected.len(),
            uncorrected = self.uncorrected.len(),
            path = %corrected_path.as_ref().display(),
            "Exported results"
        );
        Ok(())
    }

    /// Plot model of every recorded ROC curve.
    #[must_use]
    pub fn roc_plot(&self) -> RocPlot {
        RocPlot::new(self.roc.clone())
    }

    /// Render the ROC comparison chart as SVG.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Plot`] if the chart cannot be drawn or written.
    pub fn render_roc_plot(&self, path: impl AsRef<Path>) -> Result<()> {
        self.roc_plot().render_svg(path.as_ref())?;
        info!(series = self.roc.len(), path = %path.as_ref().display(), "Rendered ROC curves");
        Ok(())
    }
}

const CORRECTED_HEADER: &[&str] = &[
    "",
    "classification",
    "ratio",
    "correction",
    "auc",
    "f1",
    "fpr",
    "score",
    "auc-delta",
    "f1-delta",
    "fpr-delta",
];

const UNCORRECTED_HEADER: &[&str] = &["", "classification", "ratio", "auc", "f1", "fpr", "score"];

/// Writes the header explicitly so an empty table still has one.
fn write_rows<T: Serialize>(path: &Path, rows: &[T], header: &[&str]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(header)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
