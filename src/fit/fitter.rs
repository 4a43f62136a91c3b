//! Fitting routines for a single polynomial model.
//!
//! Given paired samples `(x_i, y_i)` we solve
//!
//! ```text
//! minimize Σ (model(x_i, p) − y_i)²
//! ```
//!
//! with Levenberg–Marquardt from a fixed initial guess (all ones unless the
//! caller supplies one), then estimate the parameter covariance from the
//! Jacobian at the optimum. No randomness is involved, so identical inputs
//! always produce identical parameters.

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::domain::{CurveModel, FitQuality, FitResult, ModelKind, SampleSet};
use crate::error::AppError;
use crate::math::{LeastSquaresProblem, LmOptions, estimate_covariance, levenberg_marquardt, standard_errors};
use crate::models::{fill_jacobian_row, predict};

/// Fitting options that affect how each model is calibrated.
#[derive(Debug, Clone, Default)]
pub struct FitOptions {
    /// Iteration budget; `None` means `200·(p+1)`.
    pub max_iters: Option<usize>,
    /// Overrides for the solver tolerances (MINPACK defaults otherwise).
    pub ftol: Option<f64>,
    pub xtol: Option<f64>,
    pub gtol: Option<f64>,
    /// Starting parameters; `None` means all ones.
    pub initial_guess: Option<Vec<f64>>,
}

impl FitOptions {
    fn lm_options(&self, p: usize) -> LmOptions {
        let defaults = LmOptions::for_params(p);
        LmOptions {
            max_iters: self.max_iters.unwrap_or(defaults.max_iters),
            ftol: self.ftol.unwrap_or(defaults.ftol),
            xtol: self.xtol.unwrap_or(defaults.xtol),
            gtol: self.gtol.unwrap_or(defaults.gtol),
            initial_damping: defaults.initial_damping,
        }
    }
}

/// Residuals `model(x_i, p) − y_i` for one polynomial kind.
struct PolynomialProblem<'a> {
    model: ModelKind,
    samples: &'a SampleSet,
}

impl LeastSquaresProblem for PolynomialProblem<'_> {
    fn param_count(&self) -> usize {
        self.model.param_count()
    }

    fn residuals(&self, params: &DVector<f64>) -> DVector<f64> {
        let params = params.as_slice();
        DVector::from_iterator(
            self.samples.len(),
            self.samples.points().map(|(x, y)| predict(self.model, x, params) - y),
        )
    }

    fn jacobian(&self, _params: &DVector<f64>) -> DMatrix<f64> {
        let p = self.model.param_count();
        let mut jac = DMatrix::<f64>::zeros(self.samples.len(), p);
        let mut row = vec![0.0; p];
        for (i, &x) in self.samples.x().iter().enumerate() {
            fill_jacobian_row(self.model, x, &mut row);
            for (j, &v) in row.iter().enumerate() {
                jac[(i, j)] = v;
            }
        }
        jac
    }
}

/// Fit a single model kind to the samples.
pub fn fit_model(model: ModelKind, samples: &SampleSet, opts: &FitOptions) -> Result<FitResult, AppError> {
    let p = model.param_count();
    let initial = match &opts.initial_guess {
        Some(guess) if guess.len() != p => {
            return Err(AppError::fit(format!(
                "Initial guess for the {} model needs {p} values, got {}.",
                model.display_name(),
                guess.len()
            )));
        }
        Some(guess) => DVector::from_column_slice(guess),
        None => DVector::from_element(p, 1.0),
    };

    debug!(model = model.display_name(), n = samples.len(), "fitting");
    let problem = PolynomialProblem { model, samples };
    let report = levenberg_marquardt(&problem, initial, &opts.lm_options(p)).map_err(|e| {
        AppError::new(
            e.exit_code(),
            format!("Fit of the {} model failed: {e}", model.display_name()),
        )
    })?;

    let params: Vec<f64> = report.params.iter().copied().collect();
    if params.iter().any(|v| !v.is_finite()) {
        return Err(AppError::fit(format!(
            "Fit of the {} model produced non-finite parameters.",
            model.display_name()
        )));
    }

    let covariance = estimate_covariance(&report.jacobian, report.sse);
    let std_errors = standard_errors(&covariance);
    let covariance: Vec<Vec<f64>> = covariance
        .row_iter()
        .map(|row| row.iter().copied().collect())
        .collect();

    let n = samples.len();
    let quality = FitQuality {
        sse: report.sse,
        rmse: (report.sse / n as f64).sqrt(),
        r_squared: r_squared(samples.y(), report.sse),
        n,
        iterations: report.iterations,
        evaluations: report.evaluations,
        termination: report.termination,
    };

    info!(
        model = model.display_name(),
        iterations = quality.iterations,
        sse = quality.sse,
        "fit converged"
    );

    Ok(FitResult {
        model: CurveModel {
            kind: model,
            display_name: model.display_name().to_string(),
            params,
        },
        covariance,
        std_errors,
        quality,
    })
}

/// Fit several model kinds and return the results in request order.
///
/// Models are independent, so they are fitted in parallel. The first failure
/// (in request order) is returned.
pub fn fit_models(models: &[ModelKind], samples: &SampleSet, opts: &FitOptions) -> Result<Vec<FitResult>, AppError> {
    models
        .par_iter()
        .map(|&model| fit_model(model, samples, opts))
        .collect::<Vec<_>>()
        .into_iter()
        .collect()
}

/// Coefficient of determination, `1 − SSE/SST`.
///
/// A constant `y` has no variance to explain; that case reports `1.0` for a
/// perfect fit and `0.0` otherwise.
fn r_squared(y: &[f64], sse: f64) -> f64 {
    let n = y.len() as f64;
    let mean = y.iter().sum::<f64>() / n;
    let sst: f64 = y.iter().map(|v| (v - mean) * (v - mean)).sum();
    if sst > 0.0 {
        1.0 - sse / sst
    } else if sse == 0.0 {
        1.0
    } else {
        0.0
    }
}
