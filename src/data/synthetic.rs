//! Synthetic calibration samples drawn from a known polynomial.
//!
//! Useful for checking that the solver recovers the generating coefficients:
//! with `noise = 0` the fit should reproduce them to solver tolerance.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{SampleSet, SyntheticSpec};
use crate::error::AppError;

/// Evaluate a polynomial given coefficients highest power first.
pub fn eval_polynomial(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().fold(0.0, |acc, &c| acc * x + c)
}

/// Generate evenly spaced samples `y = poly(x) + N(0, noise²)`.
///
/// The noise stream is seeded, so the same spec always yields the same samples.
pub fn generate_samples(spec: &SyntheticSpec) -> Result<SampleSet, AppError> {
    if spec.coeffs.is_empty() {
        return Err(AppError::samples("Synthetic polynomial needs at least one coefficient."));
    }
    if spec.points < 2 {
        return Err(AppError::samples("Synthetic sample count must be >= 2."));
    }
    if !(spec.x_from.is_finite() && spec.x_to.is_finite() && spec.x_to > spec.x_from) {
        return Err(AppError::samples(format!(
            "Invalid synthetic x range [{}, {}].",
            spec.x_from, spec.x_to
        )));
    }
    if !(spec.noise.is_finite() && spec.noise >= 0.0) {
        return Err(AppError::samples(format!("Invalid noise level {}.", spec.noise)));
    }

    let mut rng = StdRng::seed_from_u64(spec.seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::samples(format!("Noise distribution error: {e}")))?;

    let step = (spec.x_to - spec.x_from) / (spec.points as f64 - 1.0);
    let mut x = Vec::with_capacity(spec.points);
    let mut y = Vec::with_capacity(spec.points);
    for i in 0..spec.points {
        let xi = spec.x_from + step * i as f64;
        let eps = if spec.noise > 0.0 { spec.noise * normal.sample(&mut rng) } else { 0.0 };
        x.push(xi);
        y.push(eval_polynomial(&spec.coeffs, xi) + eps);
    }

    SampleSet::new(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(coeffs: &[f64], noise: f64, seed: u64) -> SyntheticSpec {
        SyntheticSpec {
            coeffs: coeffs.to_vec(),
            points: 11,
            x_from: -8.0,
            x_to: 40.0,
            noise,
            seed,
        }
    }

    #[test]
    fn polynomial_is_highest_power_first() {
        assert_eq!(eval_polynomial(&[3.0, 7.0], 2.0), 13.0);
        assert_eq!(eval_polynomial(&[1.0, 0.0, 0.0, 0.0], 3.0), 27.0);
    }

    #[test]
    fn noiseless_samples_lie_on_the_polynomial() {
        let samples = generate_samples(&spec(&[3.0, 7.0], 0.0, 1)).unwrap();
        assert_eq!(samples.len(), 11);
        assert_eq!(samples.x()[0], -8.0);
        assert_eq!(samples.x()[10], 40.0);
        for (x, y) in samples.points() {
            assert_eq!(y, 3.0 * x + 7.0);
        }
    }

    #[test]
    fn same_seed_same_samples() {
        let a = generate_samples(&spec(&[3.0, 7.0], 0.5, 42)).unwrap();
        let b = generate_samples(&spec(&[3.0, 7.0], 0.5, 42)).unwrap();
        let c = generate_samples(&spec(&[3.0, 7.0], 0.5, 43)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn invalid_specs_are_rejected() {
        assert!(generate_samples(&spec(&[], 0.0, 1)).is_err());
        assert!(generate_samples(&spec(&[1.0], -1.0, 1)).is_err());

        let mut s = spec(&[1.0], 0.0, 1);
        s.x_to = s.x_from;
        assert!(generate_samples(&s).is_err());
    }
}
