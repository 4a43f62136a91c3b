//! The fixed temperature/DAC calibration table.

use crate::domain::SampleSet;
use crate::error::AppError;

/// Temperatures in °C.
pub const CALIBRATION_TEMPERATURES: [f64; 11] =
    [-8.0, -5.0, 0.0, 5.0, 10.0, 15.0, 20.0, 25.0, 30.0, 35.0, 40.0];

/// Raw DAC codes measured at `CALIBRATION_TEMPERATURES`.
pub const CALIBRATION_DAC_CODES: [f64; 11] = [
    7080.0, 6840.0, 6400.0, 5970.0, 5560.0, 5090.0, 4620.0, 4120.0, 3680.0, 3240.0, 2860.0,
];

/// The built-in 11-point calibration sample set.
pub fn builtin_samples() -> Result<SampleSet, AppError> {
    SampleSet::new(CALIBRATION_TEMPERATURES.to_vec(), CALIBRATION_DAC_CODES.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_has_eleven_paired_points() {
        let samples = builtin_samples().unwrap();
        assert_eq!(samples.len(), 11);

        let stats = samples.stats();
        assert_eq!(stats.x_min, -8.0);
        assert_eq!(stats.x_max, 40.0);
        assert_eq!(stats.y_min, 2860.0);
        assert_eq!(stats.y_max, 7080.0);
    }
}
