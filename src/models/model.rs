//! Polynomial model evaluation.
//!
//! The fitter relies on two primitive operations:
//! - predict `y(x)` given the parameter vector (for residuals/plots)
//! - fill a Jacobian row `∂y/∂params` at `x` (for the solver)
//!
//! Both models are linear in their parameters, so the Jacobian row does not
//! depend on the current parameter values.

use crate::domain::ModelKind;

/// `y = a·x + b`
pub fn linear(x: f64, a: f64, b: f64) -> f64 {
    a * x + b
}

/// `y = a·x³ + b·x² + c·x + d`
///
/// Evaluated term by term (not Horner) so results match the expanded formula
/// exactly.
pub fn cubic(x: f64, a: f64, b: f64, c: f64, d: f64) -> f64 {
    a * x * x * x + b * x * x + c * x + d
}

/// Predict `y(x)` for the given model kind.
///
/// # Panics
/// Panics if `params` is shorter than `model.param_count()`.
pub fn predict(model: ModelKind, x: f64, params: &[f64]) -> f64 {
    match model {
        ModelKind::Linear => linear(x, params[0], params[1]),
        ModelKind::Cubic => cubic(x, params[0], params[1], params[2], params[3]),
    }
}

/// Evaluate the model elementwise over `xs`.
pub fn predict_many(model: ModelKind, xs: &[f64], params: &[f64]) -> Vec<f64> {
    xs.iter().map(|&x| predict(model, x, params)).collect()
}

/// Fill the partial derivatives of `y(x)` with respect to each parameter.
///
/// # Panics
/// Panics if `out` does not have length `model.param_count()`.
pub fn fill_jacobian_row(model: ModelKind, x: f64, out: &mut [f64]) {
    match model {
        ModelKind::Linear => {
            out[0] = x;
            out[1] = 1.0;
        }
        ModelKind::Cubic => {
            out[0] = x * x * x;
            out[1] = x * x;
            out[2] = x;
            out[3] = 1.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_matches_formula_exactly() {
        for &x in &[-8.0, -0.5, 0.0, 1.0 / 3.0, 17.25, 40.0] {
            for &(a, b) in &[(3.0, 7.0), (-84.5454, 6396.5454), (1e-3, -1e5)] {
                assert_eq!(linear(x, a, b), a * x + b);
                assert_eq!(predict(ModelKind::Linear, x, &[a, b]), a * x + b);
            }
        }
    }

    #[test]
    fn cubic_matches_formula_exactly() {
        let (a, b, c, d) = (0.0123, -0.456, -83.2, 6400.1);
        for &x in &[-20.0_f64, -8.0, 0.0, 0.1, 12.5, 40.0] {
            let expected = a * x.powi(3) + b * x.powi(2) + c * x + d;
            assert_eq!(cubic(x, a, b, c, d), a * x * x * x + b * x * x + c * x + d);
            assert!((cubic(x, a, b, c, d) - expected).abs() <= 1e-9 * expected.abs().max(1.0));
        }
    }

    #[test]
    fn predict_at_zero_is_the_intercept() {
        assert_eq!(predict(ModelKind::Linear, 0.0, &[-84.5, 6396.5]), 6396.5);
        assert_eq!(predict(ModelKind::Cubic, 0.0, &[1.0, -1.0, -100.0, 6300.0]), 6300.0);
    }

    #[test]
    fn predict_many_broadcasts() {
        let ys = predict_many(ModelKind::Linear, &[0.0, 1.0, 2.0], &[3.0, 7.0]);
        assert_eq!(ys, vec![7.0, 10.0, 13.0]);
    }

    #[test]
    fn jacobian_row_is_monomial_basis() {
        let mut row = [0.0; 4];
        fill_jacobian_row(ModelKind::Cubic, 2.0, &mut row);
        assert_eq!(row, [8.0, 4.0, 2.0, 1.0]);

        let mut row = [0.0; 2];
        fill_jacobian_row(ModelKind::Linear, -5.0, &mut row);
        assert_eq!(row, [-5.0, 1.0]);
    }
}
