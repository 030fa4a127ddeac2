//! Ratio specification parsing
//!
//! A ratio spec fixes the crop side of the crop:weed class ratio and either
//! fixes or sweeps the weed side:
//!
//! ```text
//! 10:2       crop 10, weed [2]
//! 10:1-10    crop 10, weed linspace(1, 10, steps)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use trueno_imbalance::ratio::RatioSpec;
//!
//! let spec = RatioSpec::parse("10:1-10", 5)?;
//! assert_eq!(spec.weeds(), &[1.0, 3.25, 5.5, 7.75, 10.0]);
//! assert_eq!(spec.labels()[1], "10.0:3.25");
//! # Ok::<(), trueno_imbalance::Error>(())
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Parsed ratio specification: one crop value and the weed values to sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioSpec {
    crop: f64,
    weeds: Vec<f64>,
}

impl RatioSpec {
    /// Parse `"<crop>:<weed>"` or `"<crop>:<low>-<high>"`.
    ///
    /// A range produces `steps` evenly spaced values from `low` to `high`
    /// inclusive.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRatio`] when the spec does not split into
    /// exactly two colon-separated parts or a part is not a number.
    pub fn parse(spec: &str, steps: usize) -> Result<Self> {
        let parts: Vec<&str> = spec.split(':').collect();
        if parts.len() != 2 {
            return Err(Error::InvalidRatio(spec.to_string()));
        }

        let crop = parse_value(parts[0], spec)?;
        let bounds: Vec<&str> = parts[1].split('-').collect();
        let weeds = if bounds.len() == 2 {
            let low = parse_value(bounds[0], spec)?;
            let high = parse_value(bounds[1], spec)?;
            linspace(low, high, steps)
        } else {
            vec![parse_value(parts[1], spec)?]
        };

        Ok(Self { crop, weeds })
    }

    /// Create a spec from already-known values.
    #[must_use]
    pub fn new(crop: f64, weeds: Vec<f64>) -> Self {
        Self { crop, weeds }
    }

    /// Desired crop share.
    #[must_use]
    pub const fn crop(&self) -> f64 {
        self.crop
    }

    /// Weed shares, in sweep order.
    #[must_use]
    pub fn weeds(&self) -> &[f64] {
        &self.weeds
    }

    /// Ratio labels (`"crop:weed"`) in sweep order.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.weeds
            .iter()
            .map(|&weed| ratio_label(self.crop, weed))
            .collect()
    }
}

impl fmt::Display for RatioSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}:{:?}", self.crop, self.weeds)
    }
}

/// Render a ratio as `"crop:weed"`, e.g. `10.0:2.5` or `1e+16:1.0`.
#[must_use]
pub fn ratio_label(crop: f64, weed: f64) -> String {
    format!("{}:{}", float_repr(crop), float_repr(weed))
}

/// Shortest round-trip form of `value`: a decimal point for plain values,
/// a signed exponent of at least two digits for very large or small ones.
fn float_repr(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    let debug = format!("{value:?}");
    match debug.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = exponent
                .strip_prefix('-')
                .map_or(("+", exponent), |digits| ("-", digits));
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => debug,
    }
}

/// Parse a ratio label back into `(crop, weed)`.
///
/// # Errors
///
/// Returns [`Error::InvalidRatio`] if the label is not two numbers joined by `:`.
pub fn parse_label(label: &str) -> Result<(f64, f64)> {
    let (crop, weed) = label
        .split_once(':')
        .ok_or_else(|| Error::InvalidRatio(label.to_string()))?;
    Ok((parse_value(crop, label)?, parse_value(weed, label)?))
}

/// `steps` evenly spaced values over `[start, end]`, both ends included.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn linspace(start: f64, end: f64, steps: usize) -> Vec<f64> {
    match steps {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (steps - 1) as f64;
            let mut values: Vec<f64> = (0..steps).map(|i| start + step * i as f64).collect();
            // Pin the endpoint so accumulated rounding never drifts past it
            values[steps - 1] = end;
            values
        }
    }
}

fn parse_value(raw: &str, spec: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| Error::InvalidRatio(spec.to_string()))
}
