//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - rendered by the chart front-ends without re-fitting

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Which model(s) to fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModelSpec {
    /// Linear and cubic (the calibration default).
    Both,
    Linear,
    Cubic,
}

impl ModelSpec {
    pub fn kinds(self) -> Vec<ModelKind> {
        match self {
            ModelSpec::Both => vec![ModelKind::Linear, ModelKind::Cubic],
            ModelSpec::Linear => vec![ModelKind::Linear],
            ModelSpec::Cubic => vec![ModelKind::Cubic],
        }
    }
}

/// Concrete polynomial model kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// `y = a·x + b`
    Linear,
    /// `y = a·x³ + b·x² + c·x + d`
    Cubic,
}

impl ModelKind {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::Linear => "linear",
            ModelKind::Cubic => "cubic",
        }
    }

    /// Number of fitted parameters.
    pub fn param_count(self) -> usize {
        match self {
            ModelKind::Linear => 2,
            ModelKind::Cubic => 4,
        }
    }

    /// Parameter names, highest power first.
    pub fn param_names(self) -> &'static [&'static str] {
        match self {
            ModelKind::Linear => &["a", "b"],
            ModelKind::Cubic => &["a", "b", "c", "d"],
        }
    }
}

/// Paired calibration samples: `x` (temperature) and `y` (raw DAC code).
///
/// The constructor enforces the invariants the fitter relies on, so a
/// `SampleSet` is always non-empty, equal-length and finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSet {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl SampleSet {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self, AppError> {
        if x.len() != y.len() {
            return Err(AppError::samples(format!(
                "Sample arrays differ in length: x has {}, y has {}.",
                x.len(),
                y.len()
            )));
        }
        if x.is_empty() {
            return Err(AppError::samples("Sample set is empty."));
        }
        if let Some(i) = x.iter().zip(y.iter()).position(|(a, b)| !a.is_finite() || !b.is_finite()) {
            return Err(AppError::samples(format!(
                "Sample {i} is not finite (x={}, y={}).",
                x[i], y[i]
            )));
        }
        Ok(Self { x, y })
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// `(x, y)` pairs in sample order.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }

    pub fn stats(&self) -> SampleStats {
        let fold = |v: &[f64]| {
            v.iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &s| (lo.min(s), hi.max(s)))
        };
        let (x_min, x_max) = fold(&self.x);
        let (y_min, y_max) = fold(&self.y);
        SampleStats {
            n_points: self.len(),
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }
}

/// Summary stats about the samples actually used for fitting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleStats {
    pub n_points: usize,
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

/// Polynomial the synthetic sample generator draws from.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticSpec {
    /// Coefficients, highest power first (`[a, b]` is `a·x + b`).
    pub coeffs: Vec<f64>,
    pub points: usize,
    pub x_from: f64,
    pub x_to: f64,
    /// Standard deviation of additive Gaussian noise (0 = exact).
    pub noise: f64,
    pub seed: u64,
}

/// Where the samples come from.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleSource {
    /// The fixed 11-point temperature/DAC table.
    Builtin,
    /// A two-column `x,y` CSV file.
    Csv(PathBuf),
    Synthetic(SyntheticSpec),
}

/// Why the solver stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Residuals are exactly zero.
    ZeroResidual,
    /// Relative cost reduction fell below `ftol`.
    CostTolerance,
    /// Relative step size fell below `xtol`.
    StepTolerance,
    /// Residual is orthogonal to the Jacobian columns within `gtol`.
    GradientTolerance,
}

impl Termination {
    pub fn describe(self) -> &'static str {
        match self {
            Termination::ZeroResidual => "zero residual",
            Termination::CostTolerance => "cost reduction below ftol",
            Termination::StepTolerance => "step size below xtol",
            Termination::GradientTolerance => "gradient below gtol",
        }
    }
}

/// Fit quality diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitQuality {
    pub sse: f64,
    pub rmse: f64,
    pub r_squared: f64,
    pub n: usize,
    pub iterations: usize,
    pub evaluations: usize,
    pub termination: Termination,
}

/// Fitted model parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveModel {
    pub kind: ModelKind,
    pub display_name: String,
    /// Highest power first, matching `ModelKind::param_names`.
    pub params: Vec<f64>,
}

/// Fit output for a single model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitResult {
    pub model: CurveModel,
    /// Parameter covariance estimate (row-major, `p × p`).
    #[serde(with = "crate::domain::json_float::matrix")]
    pub covariance: Vec<Vec<f64>>,
    /// One-sigma parameter uncertainties, `sqrt(diag(covariance))`.
    #[serde(with = "crate::domain::json_float::vec")]
    pub std_errors: Vec<f64>,
    pub quality: FitQuality,
}

/// A per-sample fitted value (used for reports and exports).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleResidual {
    pub x: f64,
    pub y_obs: f64,
    pub y_fit: f64,
    pub residual: f64,
}

/// A fitted curve evaluated on a dense x grid (for plotting/exports).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveGrid {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl CurveGrid {
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.x.iter().copied().zip(self.y.iter().copied()).collect()
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub source: SampleSource,
    pub model_spec: ModelSpec,

    /// Iteration budget; `None` means `200·(p+1)`.
    pub max_iters: Option<usize>,
    pub ftol: f64,
    pub xtol: f64,
    pub gtol: f64,

    /// Dense plotting grid, deliberately wider than the sample domain.
    pub grid_x_min: f64,
    pub grid_x_max: f64,
    pub grid_points: usize,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_json: Option<PathBuf>,
    pub export_csv: Option<PathBuf>,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            source: SampleSource::Builtin,
            model_spec: ModelSpec::Both,
            max_iters: None,
            ftol: DEFAULT_TOLERANCE,
            xtol: DEFAULT_TOLERANCE,
            gtol: 0.0,
            grid_x_min: -20.0,
            grid_x_max: 40.0,
            grid_points: 100,
            plot: true,
            plot_width: 100,
            plot_height: 25,
            export_json: None,
            export_csv: None,
        }
    }
}

/// MINPACK's default `ftol`/`xtol` (`sqrt` of machine epsilon, rounded).
pub const DEFAULT_TOLERANCE: f64 = 1.49012e-8;

/// A saved fit file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub samples: SampleSet,
    pub stats: SampleStats,
    pub fits: Vec<FitFileEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitFileEntry {
    pub fit: FitResult,
    pub grid: CurveGrid,
}
