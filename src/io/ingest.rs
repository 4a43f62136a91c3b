//! CSV ingest for calibration samples.
//!
//! Expected layout: a header row, then one `x,y` pair per row. Columns are
//! located by name (`x`/`temperature`/`temp` and `y`/`dac`/`dac_value`/`code`,
//! case-insensitive); when neither name matches, the first two columns are used.
//!
//! Calibration tables are small and hand-edited, so any unparsable row is an
//! error (with its line number) rather than being skipped.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::debug;

use crate::domain::SampleSet;
use crate::error::AppError;

const X_ALIASES: &[&str] = &["x", "temperature", "temp", "t"];
const Y_ALIASES: &[&str] = &["y", "dac", "dac_value", "code"];

/// Read a sample set from a CSV file.
pub fn read_samples_csv(path: &Path) -> Result<SampleSet, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open CSV '{}': {e}", path.display())))?;
    let samples = parse_samples_csv(file)?;
    debug!(path = %path.display(), n = samples.len(), "loaded samples");
    Ok(samples)
}

/// Parse a sample set from any CSV reader.
pub fn parse_samples_csv<R: Read>(input: R) -> Result<SampleSet, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::io(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let (x_col, y_col) = resolve_columns(&headers)?;

    let mut x = Vec::new();
    let mut y = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // Fallback when the reader has no position: records() starts after the
        // header, and lines are 1-based.
        let record = result.map_err(|e| AppError::io(format!("CSV parse error: {e}")))?;
        let line = record.position().map_or(idx as u64 + 2, |p| p.line());
        x.push(parse_field(&record, x_col, line)?);
        y.push(parse_field(&record, y_col, line)?);
    }

    SampleSet::new(x, y)
}

fn resolve_columns(headers: &StringRecord) -> Result<(usize, usize), AppError> {
    if headers.len() < 2 {
        return Err(AppError::io(format!(
            "CSV needs at least two columns (x, y); found {}.",
            headers.len()
        )));
    }

    let names: Vec<String> = headers.iter().map(normalize_header_name).collect();
    let find = |aliases: &[&str]| names.iter().position(|n| aliases.contains(&n.as_str()));

    match (find(X_ALIASES), find(Y_ALIASES)) {
        (Some(x), Some(y)) if x != y => Ok((x, y)),
        (None, None) => Ok((0, 1)),
        _ => Err(AppError::io(format!(
            "Could not identify x and y columns in header [{}].",
            names.join(", ")
        ))),
    }
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}

fn parse_field(record: &StringRecord, col: usize, line: u64) -> Result<f64, AppError> {
    let raw = record
        .get(col)
        .ok_or_else(|| AppError::io(format!("Line {line}: missing column {}.", col + 1)))?;
    raw.parse::<f64>()
        .map_err(|_| AppError::io(format!("Line {line}: '{raw}' is not a number.")))
}
