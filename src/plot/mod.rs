//! Chart rendering.
//!
//! All renderers consume the same precomputed `ChartData`:
//! - `ascii`: fixed-size character grid for stdout
//! - `svg`: Plotters SVG file
//! - the interactive terminal chart lives in `crate::tui`

pub mod ascii;
pub mod svg;

pub use ascii::*;
pub use svg::*;

use crate::domain::{CurveGrid, FitResult, ModelKind, SampleSet};
use crate::report::legend_label;

pub const X_LABEL: &str = "Temperature [°C]";
pub const Y_LABEL: &str = "DAC value";
pub const DATA_LABEL: &str = "data";

/// One fitted curve, ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub kind: ModelKind,
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

/// Everything a renderer needs: fitted curves, raw samples and bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub curves: Vec<ChartSeries>,
    pub samples: Vec<(f64, f64)>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl ChartData {
    /// Build chart data from fits and their dense grids (same order).
    pub fn new(samples: &SampleSet, fits: &[FitResult], grids: &[CurveGrid]) -> Self {
        let curves: Vec<ChartSeries> = fits
            .iter()
            .zip(grids.iter())
            .map(|(fit, grid)| ChartSeries {
                kind: fit.model.kind,
                label: legend_label(fit),
                points: grid.points(),
            })
            .collect();
        let samples: Vec<(f64, f64)> = samples.points().collect();

        let all = || {
            curves
                .iter()
                .flat_map(|c| c.points.iter().copied())
                .chain(samples.iter().copied())
                .filter(|(x, y)| x.is_finite() && y.is_finite())
        };
        let x_bounds = span(all().map(|(x, _)| x)).unwrap_or([0.0, 1.0]);
        let y_bounds = span(all().map(|(_, y)| y))
            .map(|[lo, hi]| pad_range(lo, hi, 0.05))
            .unwrap_or([0.0, 1.0]);

        Self {
            curves,
            samples,
            x_bounds,
            y_bounds,
        }
    }
}

/// Plot colour per model (green linear, red cubic; samples are blue).
pub fn series_rgb(kind: ModelKind) -> (u8, u8, u8) {
    match kind {
        ModelKind::Linear => (0, 160, 0),
        ModelKind::Cubic => (220, 0, 0),
    }
}

pub const DATA_RGB: (u8, u8, u8) = (0, 0, 230);

fn span(values: impl Iterator<Item = f64>) -> Option<[f64; 2]> {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo.is_finite() && hi.is_finite() {
        if hi > lo {
            Some([lo, hi])
        } else {
            Some([lo - 0.5, hi + 0.5])
        }
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> [f64; 2] {
    let pad = ((max - min).abs() * frac).max(1e-12);
    [min - pad, max + pad]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::builtin_samples;
    use crate::fit::{FitOptions, fit_models};
    use crate::io::build_grid;

    #[test]
    fn chart_data_covers_grid_and_samples() {
        let samples = builtin_samples().unwrap();
        let fits = fit_models(&[ModelKind::Linear, ModelKind::Cubic], &samples, &FitOptions::default()).unwrap();
        let grids: Vec<CurveGrid> = fits.iter().map(|f| build_grid(f, -20.0, 40.0, 100)).collect();
        let data = ChartData::new(&samples, &fits, &grids);

        assert_eq!(data.curves.len(), 2);
        assert_eq!(data.samples.len(), 11);
        assert_eq!(data.x_bounds, [-20.0, 40.0]);
        assert!(data.y_bounds[0] < 2860.0 && data.y_bounds[1] > 7080.0);
        assert!(data.curves[0].label.starts_with("fit: a="));
        assert_eq!(data.curves[1].kind, ModelKind::Cubic);
    }

    #[test]
    fn degenerate_span_is_widened() {
        assert_eq!(span([2.0, 2.0].into_iter()), Some([1.5, 2.5]));
        assert_eq!(span(std::iter::empty()), None);
    }
}
