//! Error types for trueno-imbalance
//!
//! Clear error messages with actionable guidance: every variant names the
//! offending input so a failed sweep can be fixed without a debugger.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// trueno-imbalance error types
#[derive(Error, Debug)]
pub enum Error {
    /// Ratio specification is not of the form `C:N` or `C:N-M`
    #[error("Invalid ratio specified: {0}\nExpected <crop>:<weed> or <crop>:<low>-<high>, e.g. 10:1-10")]
    InvalidRatio(String),

    /// Classification technique name is not recognized
    #[error("Unknown classifier: {0}")]
    UnknownClassifier(String),

    /// Correction technique name is not recognized
    #[error("Unknown correction technique: {0}")]
    UnknownCorrection(String),

    /// Subset name is not recognized
    #[error("Unknown subset: {0} (expected train, test or all)")]
    UnknownSubset(String),

    /// Corrected run recorded before its uncorrected baseline
    #[error("Missing uncorrected baseline for {0}\nThe uncorrected sweep must run before any corrected run. Please report this issue.")]
    MissingBaseline(String),

    /// Output directory does not exist or is not a directory
    #[error("Unable to access directory: {0}")]
    InvalidDirectory(String),

    /// Options file is missing, malformed or lacks a required key
    #[error("Options error: {0}")]
    Options(String),

    /// Dataset is unreadable or unusable for the requested run
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Model fitting failed
    #[error("Training error: {0}")]
    Training(String),

    /// Metrics cannot be computed for the assessed data
    #[error("Metric error: {0}")]
    Metric(String),

    /// ROC chart rendering failed
    #[error("Plot error: {0}")]
    Plot(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read/write error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Arrow/Parquet error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
