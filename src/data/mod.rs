//! Sample sources: the built-in calibration table, CSV files and synthetic data.

pub mod calibration;
pub mod synthetic;

pub use calibration::*;
pub use synthetic::*;

use crate::domain::{SampleSet, SampleSource};
use crate::error::AppError;

/// Load the samples a run will fit.
pub fn load_samples(source: &SampleSource) -> Result<SampleSet, AppError> {
    match source {
        SampleSource::Builtin => builtin_samples(),
        SampleSource::Csv(path) => crate::io::ingest::read_samples_csv(path),
        SampleSource::Synthetic(spec) => generate_samples(spec),
    }
}
