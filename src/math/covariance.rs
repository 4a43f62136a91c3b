//! Parameter covariance from the Jacobian at the optimum.
//!
//! `pcov = (JᵀJ)⁺ · s²` with `s² = SSE / (n − p)`, where the pseudo-inverse is
//! built from the SVD of `J`. Singular values below `ε·max(n, p)·s_max` are
//! discarded, so collinear columns yield a finite (rank-deficient) estimate
//! instead of a blow-up.

use nalgebra::DMatrix;
use tracing::warn;

/// Estimate the covariance matrix of the fitted parameters.
///
/// When there are no degrees of freedom left (`n ≤ p`) the variance of the
/// residuals is undefined and every entry is `+∞`.
pub fn estimate_covariance(jacobian: &DMatrix<f64>, sse: f64) -> DMatrix<f64> {
    let (n, p) = jacobian.shape();

    if n <= p {
        warn!(n, p, "covariance of the parameters could not be estimated (no degrees of freedom)");
        return DMatrix::from_element(p, p, f64::INFINITY);
    }

    let svd = jacobian.clone().svd(false, true);
    let Some(v_t) = svd.v_t.as_ref() else {
        return DMatrix::from_element(p, p, f64::INFINITY);
    };

    let s_max = svd.singular_values.iter().copied().fold(0.0_f64, f64::max);
    let threshold = f64::EPSILON * n.max(p) as f64 * s_max;

    let mut pinv = DMatrix::<f64>::zeros(p, p);
    for (k, &s) in svd.singular_values.iter().enumerate() {
        if s <= threshold {
            continue;
        }
        let v = v_t.row(k).transpose();
        pinv += (&v * v.transpose()) / (s * s);
    }

    pinv * (sse / (n - p) as f64)
}

/// One-sigma uncertainties (`sqrt` of the covariance diagonal).
pub fn standard_errors(covariance: &DMatrix<f64>) -> Vec<f64> {
    covariance.diagonal().iter().map(|v| v.sqrt()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn covariance_matches_closed_form_for_a_line() {
        // Design [x, 1] on x = 0..4; (JᵀJ)⁻¹ is known in closed form.
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let mut j = DMatrix::<f64>::zeros(5, 2);
        for (i, &xi) in x.iter().enumerate() {
            j[(i, 0)] = xi;
            j[(i, 1)] = 1.0;
        }
        // Σx² = 30, Σx = 10, n = 5, det = 50.
        let sse = 3.0;
        let s2 = sse / 3.0;
        let cov = estimate_covariance(&j, sse);

        assert_relative_eq!(cov[(0, 0)], s2 * 5.0 / 50.0, max_relative = 1e-12);
        assert_relative_eq!(cov[(1, 1)], s2 * 30.0 / 50.0, max_relative = 1e-12);
        assert_relative_eq!(cov[(0, 1)], -s2 * 10.0 / 50.0, max_relative = 1e-12);
        assert_relative_eq!(cov[(1, 0)], cov[(0, 1)], max_relative = 1e-12);
    }

    #[test]
    fn covariance_is_infinite_without_degrees_of_freedom() {
        let j = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 2.0, 1.0]);
        let cov = estimate_covariance(&j, 0.0);
        assert!(cov.iter().all(|v| v.is_infinite()));
    }

    #[test]
    fn standard_errors_are_sqrt_of_diagonal() {
        let cov = DMatrix::from_row_slice(2, 2, &[4.0, 1.0, 1.0, 9.0]);
        assert_eq!(standard_errors(&cov), vec![2.0, 3.0]);
    }
}
