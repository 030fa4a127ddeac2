//! Run manifest - what one invocation did and where it wrote
//!
//! Written next to the result tables as `manifest.json`.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Result;

/// File name of the manifest inside the output directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Status of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SweepStatus {
    /// Sweep is created but not yet started.
    Pending,
    /// Sweep is currently executing.
    Running,
    /// Every run completed and outputs were written.
    Success,
    /// A run or an export failed.
    Failed,
}

/// Record of one sweep invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunManifest {
    name: String,
    status: SweepStatus,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    config: Option<serde_json::Value>,
    baseline_runs: usize,
    corrected_runs: usize,
    outputs: Vec<PathBuf>,
}

impl RunManifest {
    /// Create a manifest in Pending status.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: SweepStatus::Pending,
            started_at: None,
            ended_at: None,
            config: None,
            baseline_runs: 0,
            corrected_runs: 0,
            outputs: Vec::new(),
        }
    }

    /// Create a builder for a manifest with optional fields.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> RunManifestBuilder {
        RunManifestBuilder::new(name)
    }

    /// Get the sweep name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the current status.
    #[must_use]
    pub const fn status(&self) -> SweepStatus {
        self.status
    }

    /// Get the start timestamp, if started.
    #[must_use]
    pub const fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Get the end timestamp, if completed.
    #[must_use]
    pub const fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// Get the recorded configuration, if any.
    #[must_use]
    pub const fn config(&self) -> Option<&serde_json::Value> {
        self.config.as_ref()
    }

    /// Number of uncorrected runs.
    #[must_use]
    pub const fn baseline_runs(&self) -> usize {
        self.baseline_runs
    }

    /// Number of corrected runs.
    #[must_use]
    pub const fn corrected_runs(&self) -> usize {
        self.corrected_runs
    }

    /// Files written by the sweep.
    #[must_use]
    pub fn outputs(&self) -> &[PathBuf] {
        &self.outputs
    }

    /// Transition to Running and stamp the start time.
    pub fn start(&mut self) {
        self.status = SweepStatus::Running;
        self.started_at = Some(Utc::now());
    }

    /// Record the run counts.
    pub fn record_runs(&mut self, baseline_runs: usize, corrected_runs: usize) {
        self.baseline_runs = baseline_runs;
        self.corrected_runs = corrected_runs;
    }

    /// Add a written output file.
    pub fn add_output(&mut self, path: impl Into<PathBuf>) {
        self.outputs.push(path.into());
    }

    /// Finish with the given status and stamp the end time.
    pub fn complete(&mut self, status: SweepStatus) {
        self.status = status;
        self.ended_at = Some(Utc::now());
    }

    /// Write the manifest as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be created or serialized.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Read a manifest back.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be opened or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

/// Builder for `RunManifest`.
#[derive(Debug)]
pub struct RunManifestBuilder {
    manifest: RunManifest,
}

impl RunManifestBuilder {
    /// Create a builder with the required name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            manifest: RunManifest::new(name),
        }
    }

    /// Set the recorded configuration.
    #[must_use]
    pub fn config(mut self, config: serde_json::Value) -> Self {
        self.manifest.config = Some(config);
        self
    }

    /// Set a custom start timestamp (useful for testing).
    #[must_use]
    pub const fn started_at(mut self, started_at: DateTime<Utc>) -> Self {
        self.manifest.started_at = Some(started_at);
        self
    }

    /// Build the `RunManifest`.
    #[must_use]
    pub fn build(self) -> RunManifest {
        self.manifest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_lifecycle() {
        let mut manifest = RunManifest::new("sweep");
        assert_eq!(manifest.status(), SweepStatus::Pending);
        assert!(manifest.started_at().is_none());

        manifest.start();
        assert_eq!(manifest.status(), SweepStatus::Running);
        assert!(manifest.started_at().is_some());

        manifest.record_runs(8, 32);
        manifest.add_output("imbalance.csv");
        manifest.complete(SweepStatus::Success);

        assert_eq!(manifest.status(), SweepStatus::Success);
        assert!(manifest.ended_at() >= manifest.started_at());
        assert_eq!(manifest.baseline_runs(), 8);
        assert_eq!(manifest.corrected_runs(), 32);
        assert_eq!(manifest.outputs(), &[PathBuf::from("imbalance.csv")]);
    }

    #[test]
    fn test_manifest_write_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MANIFEST_FILE);
        let manifest = RunManifest::builder("sweep")
            .config(serde_json::json!({"ratio": "10:1-5"}))
            .build();

        manifest.write(&path).unwrap();
        let loaded = RunManifest::load(&path).unwrap();
        assert_eq!(loaded, manifest);
    }
}
