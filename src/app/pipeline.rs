//! Shared "fit pipeline" logic used by every front-end.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load samples -> fit models -> dense grids -> residuals -> chart data
//!
//! The subcommands then focus on presentation (printing, SVG, terminal chart).

use tracing::debug;

use crate::data::load_samples;
use crate::domain::{CurveGrid, FitConfig, FitFile, FitResult, SampleSet, SampleStats};
use crate::error::AppError;
use crate::fit::{FitOptions, fit_models};
use crate::io::build_grid;
use crate::plot::ChartData;
use crate::report::{ModelResiduals, compute_residuals};

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub samples: SampleSet,
    pub stats: SampleStats,
    /// One entry per requested model, in request order.
    pub fits: Vec<FitResult>,
    /// Dense curve per fit (same order as `fits`).
    pub grids: Vec<CurveGrid>,
    pub residuals: Vec<ModelResiduals>,
    pub chart: ChartData,
}

/// Execute the full fitting pipeline and return the computed outputs.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput, AppError> {
    if !(config.grid_x_min.is_finite() && config.grid_x_max.is_finite()) || config.grid_x_min >= config.grid_x_max {
        return Err(AppError::render(format!(
            "Invalid plot range: x-min ({}) must be below x-max ({}).",
            config.grid_x_min, config.grid_x_max
        )));
    }

    // 1) Load samples.
    let samples = load_samples(&config.source)?;
    let stats = samples.stats();
    debug!(n = stats.n_points, x_min = stats.x_min, x_max = stats.x_max, "samples loaded");

    // 2) Fit every requested model.
    let options = FitOptions {
        max_iters: config.max_iters,
        ftol: Some(config.ftol),
        xtol: Some(config.xtol),
        gtol: Some(config.gtol),
        initial_guess: None,
    };
    let fits = fit_models(&config.model_spec.kinds(), &samples, &options)?;

    // 3) Dense curves and residuals.
    let grids: Vec<CurveGrid> = fits
        .iter()
        .map(|fit| build_grid(fit, config.grid_x_min, config.grid_x_max, config.grid_points))
        .collect();
    let residuals = fits
        .iter()
        .map(|fit| compute_residuals(&samples, fit))
        .collect::<Result<Vec<_>, _>>()?;

    let chart = ChartData::new(&samples, &fits, &grids);

    Ok(RunOutput {
        samples,
        stats,
        fits,
        grids,
        residuals,
        chart,
    })
}

/// Rebuild run outputs from a saved fit file, without refitting.
pub fn run_from_file(doc: FitFile) -> Result<RunOutput, AppError> {
    // Deserialization skips `SampleSet::new`, so validate again.
    let samples = SampleSet::new(doc.samples.x().to_vec(), doc.samples.y().to_vec())?;
    let stats = samples.stats();
    let (fits, grids): (Vec<FitResult>, Vec<CurveGrid>) =
        doc.fits.into_iter().map(|entry| (entry.fit, entry.grid)).unzip();
    if fits.is_empty() {
        return Err(AppError::io("Fit file contains no fits."));
    }
    for fit in &fits {
        let expected = fit.model.kind.param_count();
        if fit.model.params.len() != expected {
            return Err(AppError::io(format!(
                "Fit file lists {} parameters for the {} model, expected {expected}.",
                fit.model.params.len(),
                fit.model.kind.display_name()
            )));
        }
    }
    let residuals = fits
        .iter()
        .map(|fit| compute_residuals(&samples, fit))
        .collect::<Result<Vec<_>, _>>()?;
    let chart = ChartData::new(&samples, &fits, &grids);

    Ok(RunOutput {
        samples,
        stats,
        fits,
        grids,
        residuals,
        chart,
    })
}
