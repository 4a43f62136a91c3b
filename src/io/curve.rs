//! Dense curve grids and fit JSON files.
//!
//! Fit JSON is the "portable" representation of a run:
//! - the samples that were fitted (+ stats)
//! - per model: parameters, covariance, quality
//! - a precomputed fitted grid for quick plotting
//!
//! The schema is defined by `domain::FitFile`.

use std::fs::File;
use std::path::Path;

use chrono::Utc;

use crate::domain::{CurveGrid, FitFile, FitFileEntry, FitResult, SampleSet};
use crate::error::AppError;
use crate::models::predict_many;

/// `n` evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n as f64 - 1.0);
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Evaluate a fitted model on `linspace(x_min, x_max, n)`.
pub fn build_grid(fit: &FitResult, x_min: f64, x_max: f64, n: usize) -> CurveGrid {
    let x = linspace(x_min, x_max, n.max(2));
    let y = predict_many(fit.model.kind, &x, &fit.model.params);
    CurveGrid { x, y }
}

/// Write a fit JSON file.
pub fn write_fit_json(
    path: &Path,
    samples: &SampleSet,
    fits: &[FitResult],
    grids: &[CurveGrid],
) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create fit JSON '{}': {e}", path.display())))?;

    let doc = FitFile {
        tool: "dacfit".to_string(),
        generated_at: Utc::now(),
        samples: samples.clone(),
        stats: samples.stats(),
        fits: fits
            .iter()
            .zip(grids.iter())
            .map(|(fit, grid)| FitFileEntry {
                fit: fit.clone(),
                grid: grid.clone(),
            })
            .collect(),
    };

    serde_json::to_writer_pretty(file, &doc)
        .map_err(|e| AppError::io(format!("Failed to write fit JSON: {e}")))?;

    Ok(())
}

/// Read a fit JSON file.
pub fn read_fit_json(path: &Path) -> Result<FitFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open fit JSON '{}': {e}", path.display())))?;
    let doc: FitFile =
        serde_json::from_reader(file).map_err(|e| AppError::io(format!("Invalid fit JSON: {e}")))?;
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::builtin_samples;
    use crate::fit::{FitOptions, fit_models};
    use crate::domain::ModelKind;

    #[test]
    fn linspace_hits_both_ends() {
        let xs = linspace(-20.0, 40.0, 100);
        assert_eq!(xs.len(), 100);
        assert_eq!(xs[0], -20.0);
        assert_eq!(xs[99], 40.0);
        assert!(xs.windows(2).all(|w| w[1] > w[0]));
        assert_eq!(linspace(1.0, 2.0, 1), vec![1.0]);
        assert!(linspace(1.0, 2.0, 0).is_empty());
    }

    #[test]
    fn grid_matches_model_predictions() {
        let samples = builtin_samples().unwrap();
        let fits = fit_models(&[ModelKind::Linear], &samples, &FitOptions::default()).unwrap();
        let grid = build_grid(&fits[0], -20.0, 40.0, 7);

        assert_eq!(grid.x.len(), 7);
        let p = &fits[0].model.params;
        for (x, y) in grid.x.iter().zip(grid.y.iter()) {
            assert_eq!(*y, p[0] * x + p[1]);
        }
    }

    #[test]
    fn fit_json_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fit.json");

        let samples = builtin_samples().unwrap();
        let fits = fit_models(&[ModelKind::Linear, ModelKind::Cubic], &samples, &FitOptions::default()).unwrap();
        let grids: Vec<CurveGrid> = fits.iter().map(|f| build_grid(f, -20.0, 40.0, 10)).collect();
        write_fit_json(&path, &samples, &fits, &grids).unwrap();

        let doc = read_fit_json(&path).unwrap();
        assert_eq!(doc.tool, "dacfit");
        assert_eq!(doc.samples, samples);
        assert_eq!(doc.fits.len(), 2);
        assert_eq!(doc.fits[1].fit.model.kind, ModelKind::Cubic);
        assert_eq!(doc.fits[1].fit.model.params, fits[1].model.params);
        assert_eq!(doc.fits[0].grid, grids[0]);
    }

    #[test]
    fn infinite_covariance_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fit.json");

        // Two points for two parameters: no degrees of freedom left.
        let samples = SampleSet::new(vec![0.0, 1.0], vec![1.0, 3.0]).unwrap();
        let fits = fit_models(&[ModelKind::Linear], &samples, &FitOptions::default()).unwrap();
        assert!(fits[0].std_errors.iter().all(|v| v.is_infinite()));
        let grids = vec![build_grid(&fits[0], -1.0, 2.0, 4)];
        write_fit_json(&path, &samples, &fits, &grids).unwrap();

        let doc = read_fit_json(&path).unwrap();
        let fit = &doc.fits[0].fit;
        assert!(fit.std_errors.iter().all(|v| *v == f64::INFINITY));
        assert!(fit.covariance.iter().flatten().all(|v| *v == f64::INFINITY));
    }
}
