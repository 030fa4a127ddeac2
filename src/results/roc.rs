//! ROC curve collection and the comparison chart

use std::path::Path;

use plotters::prelude::*;
use serde::Serialize;

use crate::{Error, Result};

/// Chart title.
pub const TITLE: &str = "ROC Curve";

/// Number of dash segments drawn along the no-skill diagonal.
const DIAGONAL_DASHES: usize = 20;

/// One named ROC curve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RocSeries {
    name: String,
    fpr: Vec<f64>,
    tpr: Vec<f64>,
}

impl RocSeries {
    /// Create a series from parallel FPR/TPR sequences.
    #[must_use]
    pub fn new(name: impl Into<String>, fpr: Vec<f64>, tpr: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            fpr,
            tpr,
        }
    }

    /// Get the series name (classifier display name).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the false positive rates.
    #[must_use]
    pub fn fpr(&self) -> &[f64] {
        &self.fpr
    }

    /// Get the true positive rates.
    #[must_use]
    pub fn tpr(&self) -> &[f64] {
        &self.tpr
    }

    /// `(fpr, tpr)` points.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.fpr.iter().copied().zip(self.tpr.iter().copied())
    }
}

/// Where the legend sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendPosition {
    /// Bottom-right corner of the plotting area.
    LowerRight,
}

/// Everything the ROC chart shows, independent of how it is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct RocPlot {
    /// Curves in first-recorded order
    pub series: Vec<RocSeries>,
    /// No-skill reference line
    pub diagonal: [(f64, f64); 2],
    /// X axis range
    pub x_range: (f64, f64),
    /// Y axis range
    pub y_range: (f64, f64),
    /// Legend placement
    pub legend: LegendPosition,
}

impl RocPlot {
    /// Plot model for the given curves.
    #[must_use]
    pub fn new(series: Vec<RocSeries>) -> Self {
        Self {
            series,
            diagonal: [(0.0, 0.0), (1.0, 1.0)],
            x_range: (0.0, 1.0),
            y_range: (0.0, 1.0),
            legend: LegendPosition::LowerRight,
        }
    }

    /// Draw the chart as SVG.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Plot`] if the chart cannot be drawn or written.
    pub fn render_svg(&self, path: &Path) -> Result<()> {
        let root = SVGBackend::new(path, (900, 700)).into_drawing_area();
        root.fill(&WHITE).map_err(plot_error)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(TITLE, ("sans-serif", 24))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(
                self.x_range.0..self.x_range.1,
                self.y_range.0..self.y_range.1,
            )
            .map_err(plot_error)?;

        chart
            .configure_mesh()
            .x_desc("False Positive Rate")
            .y_desc("True Positive Rate")
            .draw()
            .map_err(plot_error)?;

        for (i, series) in self.series.iter().enumerate() {
            let color = Palette99::pick(i).mix(0.9);
            chart
                .draw_series(LineSeries::new(series.points(), color.stroke_width(2)))
                .map_err(plot_error)?
                .label(series.name())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }

        let [(x0, y0), (x1, y1)] = self.diagonal;
        #[allow(clippy::cast_precision_loss)]
        let at = |k: usize| {
            let t = k as f64 / DIAGONAL_DASHES as f64;
            (x0 + t * (x1 - x0), y0 + t * (y1 - y0))
        };
        chart
            .draw_series(
                (0..DIAGONAL_DASHES)
                    .step_by(2)
                    .map(|k| PathElement::new(vec![at(k), at(k + 1)], RED)),
            )
            .map_err(plot_error)?;

        let position = match self.legend {
            LegendPosition::LowerRight => SeriesLabelPosition::LowerRight,
        };
        chart
            .configure_series_labels()
            .position(position)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(plot_error)?;

        root.present().map_err(plot_error)?;
        Ok(())
    }
}

#[allow(clippy::needless_pass_by_value)]
fn plot_error<E: std::fmt::Display>(e: E) -> Error {
    Error::Plot(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plot_model_fixed_axes() {
        let plot = RocPlot::new(vec![RocSeries::new("KNN", vec![0.0, 1.0], vec![0.0, 1.0])]);
        assert_eq!(plot.x_range, (0.0, 1.0));
        assert_eq!(plot.y_range, (0.0, 1.0));
        assert_eq!(plot.diagonal, [(0.0, 0.0), (1.0, 1.0)]);
        assert_eq!(plot.legend, LegendPosition::LowerRight);
    }

    #[test]
    fn test_series_points() {
        let series = RocSeries::new("LDA", vec![0.0, 0.5, 1.0], vec![0.0, 0.75, 1.0]);
        let points: Vec<_> = series.points().collect();
        assert_eq!(points, vec![(0.0, 0.0), (0.5, 0.75), (1.0, 1.0)]);
    }
}
