//! Options file loading.
//!
//! The options file names the feature columns every classifier trains on
//! and, optionally, the label column:
//!
//! ```toml
//! [image-processing]
//! factors = "hue, saturation, greyscale"
//!
//! [dataset]
//! label = "type"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{Error, Result};

/// Label column used when the options file does not name one.
pub const DEFAULT_LABEL_COLUMN: &str = "type";

/// Options shared by every run of a sweep.
#[derive(Debug, Clone)]
pub struct Options {
    /// Source file for these options (for display).
    pub source: Option<PathBuf>,

    /// Feature columns selected for training, in file order.
    pub selections: Vec<String>,

    /// Column holding the 0/1 class label.
    pub label: String,
}

/// Raw options as deserialized from TOML.
#[derive(Debug, Deserialize)]
struct RawOptions {
    #[serde(rename = "image-processing")]
    image_processing: Option<ImageProcessingSection>,
    dataset: Option<DatasetSection>,
}

#[derive(Debug, Deserialize)]
struct ImageProcessingSection {
    factors: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DatasetSection {
    label: Option<String>,
}

impl Options {
    /// Load options from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Options`] if the file cannot be read, is not valid
    /// TOML, or lacks `image-processing.factors`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Options(format!("{}: {e}", path.display())))?;
        let mut options = Self::parse(&content)?;
        options.source = Some(path.to_path_buf());
        Ok(options)
    }

    /// Parse options from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Options`] on malformed TOML or a missing/empty factor list.
    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawOptions =
            toml::from_str(content).map_err(|e| Error::Options(e.to_string()))?;

        let factors = raw
            .image_processing
            .and_then(|section| section.factors)
            .ok_or_else(|| Error::Options("missing [image-processing] factors".to_string()))?;

        let selections: Vec<String> = factors
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        if selections.is_empty() {
            return Err(Error::Options("[image-processing] factors is empty".to_string()));
        }

        let label = raw
            .dataset
            .and_then(|section| section.label)
            .unwrap_or_else(|| DEFAULT_LABEL_COLUMN.to_string());

        Ok(Self {
            source: None,
            selections,
            label,
        })
    }
}
