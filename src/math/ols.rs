//! Linear least squares solver.
//!
//! Used in two places:
//!
//! ```text
//! minimize ‖A x − b‖²
//! ```
//!
//! - every Levenberg–Marquardt step solves the damped system as the augmented
//!   problem `[J; √(λD)] h = [−r; 0]`
//! - tests cross-check the iterative fit against a direct polynomial solve
//!
//! We use SVD so tall (more rows than columns) and nearly rank-deficient
//! systems are handled without forming `AᵀA`. (Nalgebra's `QR::solve` is
//! intended for square systems and will panic for non-square matrices.)

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(a: &DMatrix<f64>, b: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = a.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(x) = svd.solve(b, tol) {
            if x.iter().all(|v| v.is_finite()) {
                return Some(x);
            }
        }
    }

    None
}
