//! Export per-sample residuals to CSV.
//!
//! One row per (model, sample), so the file pivots easily in a spreadsheet.

use std::path::Path;

use crate::domain::FitResult;
use crate::error::AppError;
use crate::report::ModelResiduals;

/// Write per-sample residuals for every fitted model to a CSV file.
pub fn write_residuals_csv(path: &Path, fits: &[FitResult], residuals: &[ModelResiduals]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::io(format!("Failed to create export CSV '{}': {e}", path.display())))?;

    writer
        .write_record(["model", "x", "y_obs", "y_fit", "residual"])
        .map_err(|e| AppError::io(format!("Failed to write export CSV header: {e}")))?;

    for (fit, rows) in fits.iter().zip(residuals.iter()) {
        for r in &rows.rows {
            writer
                .write_record([
                    fit.model.display_name.clone(),
                    format!("{}", r.x),
                    format!("{:.4}", r.y_obs),
                    format!("{:.4}", r.y_fit),
                    format!("{:.4}", r.residual),
                ])
                .map_err(|e| AppError::io(format!("Failed to write export CSV row: {e}")))?;
        }
    }

    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush export CSV: {e}")))?;

    Ok(())
}
