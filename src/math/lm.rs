//! Levenberg–Marquardt nonlinear least squares.
//!
//! We minimize `‖r(p)‖²` for a residual vector `r` with Jacobian `J`. Each
//! iteration solves the damped normal equations
//!
//! ```text
//! (JᵀJ + λ·D) h = −Jᵀr
//! ```
//!
//! where `D` is Marquardt's diagonal scaling (running maximum of the squared
//! Jacobian column norms). The system is solved as the equivalent augmented
//! least-squares problem `[J; √(λD)] h = [−r; 0]` so `JᵀJ` is never formed.
//!
//! Damping follows Nielsen's update on the gain ratio
//! `ρ = actual reduction / predicted reduction`.
//!
//! Termination tests mirror MINPACK (`lmder`):
//! - zero residual
//! - `ftol`: relative actual and predicted cost reductions are both small
//! - `xtol`: relative step is small
//! - `gtol`: every Jacobian column is nearly orthogonal to the residual
//!
//! Exhausting the iteration budget is an error; the caller never receives
//! parameters from a run that did not converge.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::domain::{DEFAULT_TOLERANCE, Termination};
use crate::error::AppError;
use crate::math::solve_least_squares;

/// A residual function and its Jacobian.
pub trait LeastSquaresProblem {
    /// Number of parameters being solved for.
    fn param_count(&self) -> usize;

    /// Residual vector at `params`.
    fn residuals(&self, params: &DVector<f64>) -> DVector<f64>;

    /// Jacobian of the residuals (`n × p`) at `params`.
    fn jacobian(&self, params: &DVector<f64>) -> DMatrix<f64>;
}

/// Solver tolerances and budget.
#[derive(Debug, Clone)]
pub struct LmOptions {
    pub max_iters: usize,
    pub ftol: f64,
    pub xtol: f64,
    pub gtol: f64,
    /// Starting damping factor (relative to the diagonal scaling).
    pub initial_damping: f64,
}

impl LmOptions {
    /// MINPACK defaults for a problem with `p` parameters.
    pub fn for_params(p: usize) -> Self {
        Self {
            max_iters: 200 * (p + 1),
            ftol: DEFAULT_TOLERANCE,
            xtol: DEFAULT_TOLERANCE,
            gtol: 0.0,
            initial_damping: 1e-3,
        }
    }
}

/// Outcome of a converged solve.
#[derive(Debug, Clone)]
pub struct LmReport {
    pub params: DVector<f64>,
    pub residuals: DVector<f64>,
    /// Jacobian at `params` (used for the covariance estimate).
    pub jacobian: DMatrix<f64>,
    /// Sum of squared residuals at `params`.
    pub sse: f64,
    pub iterations: usize,
    /// Residual evaluations, including the initial one.
    pub evaluations: usize,
    pub termination: Termination,
}

/// Damping above this is treated as a stalled solve.
const MAX_DAMPING: f64 = 1e32;

/// Minimize `‖r(p)‖²` starting from `initial`.
pub fn levenberg_marquardt<P: LeastSquaresProblem>(
    problem: &P,
    initial: DVector<f64>,
    opts: &LmOptions,
) -> Result<LmReport, AppError> {
    let p = problem.param_count();
    if initial.len() != p {
        return Err(AppError::fit(format!(
            "Initial guess has {} parameters, expected {p}.",
            initial.len()
        )));
    }

    let mut params = initial;
    let mut residuals = problem.residuals(&params);
    let mut evaluations = 1usize;
    if !all_finite(&residuals) {
        return Err(AppError::fit("Residuals are not finite at the initial guess."));
    }
    let mut sse = residuals.norm_squared();
    let mut jacobian = problem.jacobian(&params);

    let mut diag = DVector::<f64>::zeros(p);
    let mut damping = opts.initial_damping;
    let mut nu = 2.0;

    let finish = |params: DVector<f64>,
                  residuals: DVector<f64>,
                  jacobian: DMatrix<f64>,
                  sse: f64,
                  iterations: usize,
                  evaluations: usize,
                  termination: Termination|
     -> Result<LmReport, AppError> {
        debug!(
            iterations,
            evaluations,
            sse,
            reason = termination.describe(),
            "levenberg-marquardt converged"
        );
        Ok(LmReport {
            params,
            residuals,
            jacobian,
            sse,
            iterations,
            evaluations,
            termination,
        })
    };

    for iter in 1..=opts.max_iters {
        if sse == 0.0 {
            return finish(params, residuals, jacobian, sse, iter - 1, evaluations, Termination::ZeroResidual);
        }

        let gradient = jacobian.transpose() * &residuals;
        if max_gradient_cosine(&jacobian, &gradient, sse.sqrt()) <= opts.gtol {
            return finish(params, residuals, jacobian, sse, iter - 1, evaluations, Termination::GradientTolerance);
        }

        for j in 0..p {
            let col = jacobian.column(j).norm_squared();
            diag[j] = diag[j].max(if col > 0.0 { col } else { 1.0 });
        }

        let Some(step) = damped_step(&jacobian, &residuals, &diag, damping) else {
            damping *= nu;
            nu *= 2.0;
            if damping > MAX_DAMPING {
                break;
            }
            continue;
        };

        let candidate = &params + &step;
        let candidate_residuals = problem.residuals(&candidate);
        evaluations += 1;
        let candidate_sse = if all_finite(&candidate_residuals) {
            candidate_residuals.norm_squared()
        } else {
            f64::INFINITY
        };

        let predicted = sse - (&residuals + &jacobian * &step).norm_squared();
        let actual = sse - candidate_sse;
        let rho = if predicted > 0.0 { actual / predicted } else { -1.0 };
        let step_small = step.norm() <= opts.xtol * (params.norm() + opts.xtol);

        if rho > 0.0 {
            let previous_sse = sse;
            params = candidate;
            residuals = candidate_residuals;
            sse = candidate_sse;
            jacobian = problem.jacobian(&params);

            damping *= (1.0 / 3.0_f64).max(1.0 - (2.0 * rho - 1.0).powi(3));
            nu = 2.0;

            if actual <= opts.ftol * previous_sse && predicted <= opts.ftol * previous_sse {
                return finish(params, residuals, jacobian, sse, iter, evaluations, Termination::CostTolerance);
            }
        } else {
            damping *= nu;
            nu *= 2.0;
        }

        if step_small {
            return finish(params, residuals, jacobian, sse, iter, evaluations, Termination::StepTolerance);
        }
        if !damping.is_finite() || damping > MAX_DAMPING {
            break;
        }
    }

    Err(AppError::fit(format!(
        "Optimal parameters not found: solver did not converge within {} iterations \
         ({evaluations} residual evaluations, SSE={sse:.6e}).",
        opts.max_iters
    )))
}

/// Solve `[J; √(λD)] h = [−r; 0]` for the damped step `h`.
fn damped_step(
    jacobian: &DMatrix<f64>,
    residuals: &DVector<f64>,
    diag: &DVector<f64>,
    damping: f64,
) -> Option<DVector<f64>> {
    let (n, p) = jacobian.shape();
    let mut a = DMatrix::<f64>::zeros(n + p, p);
    let mut b = DVector::<f64>::zeros(n + p);

    a.rows_mut(0, n).copy_from(jacobian);
    for i in 0..n {
        b[i] = -residuals[i];
    }
    for j in 0..p {
        a[(n + j, j)] = (damping * diag[j]).sqrt();
    }

    solve_least_squares(&a, &b)
}

/// Largest `|J_jᵀ r| / (‖J_j‖ ‖r‖)` over the Jacobian columns.
fn max_gradient_cosine(jacobian: &DMatrix<f64>, gradient: &DVector<f64>, residual_norm: f64) -> f64 {
    if residual_norm == 0.0 {
        return 0.0;
    }
    jacobian
        .column_iter()
        .zip(gradient.iter())
        .map(|(col, &g)| {
            let norm = col.norm();
            if norm == 0.0 { 0.0 } else { (g / (norm * residual_norm)).abs() }
        })
        .fold(0.0, f64::max)
}

fn all_finite(v: &DVector<f64>) -> bool {
    v.iter().all(|x| x.is_finite())
}
