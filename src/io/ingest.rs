//! CSV ingest of raw test records.
//!
//! Two layouts are understood:
//!
//! - **curves**: column pairs `(strain, stress)`; an optional header row names
//!   each specimen (first non-empty cell of the pair)
//! - **strengths**: one row per specimen, `name, value, value, ...`; every
//!   positive value becomes a single-point record (compressive strength tables)
//!
//! Cells that do not parse as numbers become NaN and are left for the
//! validator to clean. No fitting logic here.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use clap::ValueEnum;
use csv::StringRecord;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::RawSample;
use crate::error::AppError;

/// Strength values at or below this are treated as empty cells.
const MIN_STRENGTH: f64 = 0.001;

/// Table layout of an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Curves,
    Strengths,
}

/// Load every sample of one CSV file. The group label is the file stem.
pub fn load_samples(path: &Path, layout: Layout) -> Result<Vec<RawSample>, AppError> {
    let file = File::open(path).map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    let group = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let samples = read_samples(file, &group, layout)
        .map_err(|e| AppError::new(2, format!("Failed to read CSV '{}': {e}", path.display())))?;
    if samples.is_empty() {
        return Err(AppError::new(2, format!("No samples found in '{}'.", path.display())));
    }
    debug!(file = %path.display(), samples = samples.len(), "loaded samples");
    Ok(samples)
}

/// Parse samples from any CSV reader.
pub fn read_samples<R: Read>(reader: R, group: &str, layout: Layout) -> Result<Vec<RawSample>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        match result {
            Ok(record) => rows.push(record),
            Err(e) => warn!(line = idx + 1, error = %e, "skipping unreadable CSV row"),
        }
    }
    rows.retain(|r| r.iter().any(|c| !c.is_empty()));

    Ok(match layout {
        Layout::Curves => column_pair_curves(&rows, group),
        Layout::Strengths => strength_rows(&rows, group),
    })
}

fn column_pair_curves(rows: &[StringRecord], group: &str) -> Vec<RawSample> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };
    let has_header = !first.iter().all(|c| c.is_empty() || parse_cell(c).is_finite());
    let (header, body) = if has_header { (Some(first), &rows[1..]) } else { (None, rows) };

    let width = rows.iter().map(StringRecord::len).max().unwrap_or(0);
    let mut samples = Vec::new();
    for pair in 0..width / 2 {
        let (ci, si) = (2 * pair, 2 * pair + 1);
        let (strain, stress): (Vec<f64>, Vec<f64>) = body
            .iter()
            .map(|r| (cell(r, ci), cell(r, si)))
            .filter(|(e, s)| !(e.is_nan() && s.is_nan()))
            .unzip();
        if !strain.iter().zip(&stress).any(|(e, s)| e.is_finite() && s.is_finite()) {
            continue;
        }

        let name = header
            .and_then(|h| [ci, si].into_iter().filter_map(|i| h.get(i)).find(|c| !c.is_empty()))
            .map(str::to_string)
            .unwrap_or_else(|| format!("Specimen_{}", pair + 1));
        samples.push(RawSample::new(name, group, strain, stress));
    }
    samples
}

fn strength_rows(rows: &[StringRecord], group: &str) -> Vec<RawSample> {
    let mut samples = Vec::new();
    for (idx, row) in rows.iter().enumerate() {
        let mut cells = row.iter().filter(|c| !c.is_empty());
        let name = match cells.next() {
            Some(c) if !parse_cell(c).is_finite() => c.to_string(),
            _ => {
                debug!(row = idx + 1, "strength row without a leading name; skipped");
                continue;
            }
        };
        for value in cells.map(parse_cell).filter(|v| v.is_finite() && *v > MIN_STRENGTH) {
            samples.push(RawSample::new(name.clone(), group, vec![0.0], vec![value]));
        }
    }
    samples
}

fn cell(record: &StringRecord, idx: usize) -> f64 {
    record.get(idx).map_or(f64::NAN, parse_cell)
}

fn parse_cell(cell: &str) -> f64 {
    cell.trim().parse::<f64>().unwrap_or(f64::NAN)
}
