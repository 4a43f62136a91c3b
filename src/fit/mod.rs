//! Curve fitting.

pub mod fitter;

pub use fitter::*;
