//! Numerical routines: linear least squares, Levenberg–Marquardt, covariance.

pub mod covariance;
pub mod lm;
pub mod ols;

pub use covariance::*;
pub use lm::*;
pub use ols::*;
