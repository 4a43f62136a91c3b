//! Command-line parsing for the DAC calibration fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_TOLERANCE, ModelSpec};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "dacfit", version, about = "Temperature/DAC calibration curve fitter")]
pub struct Cli {
    /// Log solver progress to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print fitted parameters and open the interactive chart (default).
    Show(ShowArgs),
    /// Print a full fit report, an ASCII chart and optional exports.
    Fit(FitArgs),
    /// Print fitted parameters and write the chart as SVG.
    Plot(PlotArgs),
}

/// Where samples come from (built-in calibration table by default).
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// Two-column `x,y` CSV file with a header row.
    #[arg(short = 'd', long, value_name = "CSV", conflicts_with = "synthetic")]
    pub data: Option<PathBuf>,

    /// Draw samples from this polynomial (highest power first), e.g. `-90,6400`.
    #[arg(long, value_name = "COEFFS", value_delimiter = ',', allow_hyphen_values = true)]
    pub synthetic: Option<Vec<f64>>,

    /// Number of synthetic samples.
    #[arg(long, default_value_t = 11)]
    pub points: usize,

    /// First synthetic x value.
    #[arg(long, default_value_t = -8.0, allow_hyphen_values = true)]
    pub x_from: f64,

    /// Last synthetic x value.
    #[arg(long, default_value_t = 40.0, allow_hyphen_values = true)]
    pub x_to: f64,

    /// Standard deviation of Gaussian noise added to synthetic samples.
    #[arg(long, default_value_t = 0.0)]
    pub noise: f64,

    /// Random seed for synthetic noise.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// Solver and curve-grid options.
#[derive(Debug, Args, Clone)]
pub struct SolverArgs {
    /// Which model(s) to fit.
    #[arg(long, value_enum, default_value_t = ModelSpec::Both)]
    pub model: ModelSpec,

    /// Iteration budget (default 200·(p+1)).
    #[arg(long)]
    pub max_iters: Option<usize>,

    /// Relative cost-reduction tolerance.
    #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
    pub ftol: f64,

    /// Relative step tolerance.
    #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
    pub xtol: f64,

    /// Gradient orthogonality tolerance.
    #[arg(long, default_value_t = 0.0)]
    pub gtol: f64,

    /// Left end of the plotted curve range.
    #[arg(long, default_value_t = -20.0, allow_hyphen_values = true)]
    pub x_min: f64,

    /// Right end of the plotted curve range.
    #[arg(long, default_value_t = 40.0, allow_hyphen_values = true)]
    pub x_max: f64,

    /// Number of points on each plotted curve.
    #[arg(long, default_value_t = 100)]
    pub grid_points: usize,
}

/// Options for `dacfit show`.
#[derive(Debug, Args, Clone)]
pub struct ShowArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub solver: SolverArgs,
}

/// Options for `dacfit fit`.
#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub solver: SolverArgs,

    /// Disable the ASCII chart.
    #[arg(long)]
    pub no_plot: bool,

    /// ASCII chart width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// ASCII chart height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export params, covariance, quality and curves to JSON.
    #[arg(long, value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    /// Export per-sample residuals to CSV.
    #[arg(long, value_name = "CSV")]
    pub export_csv: Option<PathBuf>,
}

/// Options for `dacfit plot`.
#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub solver: SolverArgs,

    /// Output SVG path.
    #[arg(short, long, value_name = "SVG")]
    pub out: PathBuf,

    /// Re-plot a JSON file from `dacfit fit --export-json` instead of fitting.
    #[arg(long, value_name = "JSON")]
    pub from: Option<PathBuf>,

    /// Image width (pixels).
    #[arg(long, default_value_t = 1024)]
    pub width: u32,

    /// Image height (pixels).
    #[arg(long, default_value_t = 768)]
    pub height: u32,
}
