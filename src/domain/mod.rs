//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - sample data (`SampleSet`, `SampleSource`)
//! - model selection (`ModelSpec`, `ModelKind`)
//! - fit outputs (`FitResult`, `CurveModel`, `CurveGrid`, etc.)

pub mod json_float;
pub mod types;

pub use types::*;
