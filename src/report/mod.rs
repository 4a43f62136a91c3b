//! Reporting utilities: residuals and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::{FitResult, ModelKind, SampleResidual, SampleSet};
use crate::error::AppError;
use crate::models::predict;

/// Fitted values and residuals of one model over every sample.
#[derive(Debug, Clone)]
pub struct ModelResiduals {
    pub model: ModelKind,
    pub rows: Vec<SampleResidual>,
}

/// Compute fitted values and residuals (`y_obs − y_fit`) for each sample.
pub fn compute_residuals(samples: &SampleSet, fit: &FitResult) -> Result<ModelResiduals, AppError> {
    let mut rows = Vec::with_capacity(samples.len());
    for (x, y_obs) in samples.points() {
        let y_fit = predict(fit.model.kind, x, &fit.model.params);
        if !y_fit.is_finite() {
            return Err(AppError::fit("Non-finite model prediction during residual computation."));
        }
        rows.push(SampleResidual {
            x,
            y_obs,
            y_fit,
            residual: y_obs - y_fit,
        });
    }
    Ok(ModelResiduals {
        model: fit.model.kind,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CurveModel, FitQuality, Termination};

    #[test]
    fn compute_residuals_basic() {
        let samples = SampleSet::new(vec![0.0, 1.0], vec![7.0, 11.0]).unwrap();
        let fit = FitResult {
            model: CurveModel {
                kind: ModelKind::Linear,
                display_name: "linear".to_string(),
                params: vec![3.0, 7.0],
            },
            covariance: vec![vec![0.0; 2]; 2],
            std_errors: vec![0.0; 2],
            quality: FitQuality {
                sse: 1.0,
                rmse: 0.0,
                r_squared: 1.0,
                n: 2,
                iterations: 1,
                evaluations: 2,
                termination: Termination::ZeroResidual,
            },
        };

        let residuals = compute_residuals(&samples, &fit).unwrap();
        assert_eq!(residuals.model, ModelKind::Linear);
        assert_eq!(residuals.rows.len(), 2);
        assert_eq!(residuals.rows[0].residual, 0.0);
        assert_eq!(residuals.rows[1].y_fit, 10.0);
        assert_eq!(residuals.rows[1].residual, 1.0);
    }
}
