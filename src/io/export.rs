//! Export batch results to JSON.
//!
//! The document holds everything a downstream script needs to rebuild the
//! report: the configuration used, per-sample flat records (including the
//! internal `_` fields), failures, and per-group statistics.

use std::fs::File;
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::info;

use crate::app::pipeline::{BatchOutput, GroupSummary, SampleFailure};
use crate::domain::{AnalysisConfig, Record, TestMode};
use crate::error::AppError;

#[derive(Debug, Serialize)]
pub struct ExportDocument<'a> {
    pub tool: &'static str,
    pub generated_at: String,
    pub mode: Option<TestMode>,
    pub config: &'a AnalysisConfig,
    pub samples: Vec<ExportedSample<'a>>,
    pub failures: &'a [SampleFailure],
    pub groups: Vec<ExportedGroup<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ExportedSample<'a> {
    pub name: &'a str,
    pub group: &'a str,
    pub metrics: Record,
}

#[derive(Debug, Serialize)]
pub struct ExportedGroup<'a> {
    pub group: &'a str,
    pub statistics: Record,
}

/// Assemble the export document for a batch.
pub fn build_export<'a>(
    output: &'a BatchOutput,
    groups: &'a [GroupSummary],
    config: &'a AnalysisConfig,
) -> ExportDocument<'a> {
    ExportDocument {
        tool: "ecc",
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        mode: output.mode,
        config,
        samples: output
            .results
            .iter()
            .map(|r| ExportedSample {
                name: &r.name,
                group: &r.group,
                metrics: r.record(),
            })
            .collect(),
        failures: &output.failures,
        groups: groups
            .iter()
            .map(|g| ExportedGroup {
                group: &g.group,
                statistics: g.stats.to_map(),
            })
            .collect(),
    }
}

/// Write the batch results as pretty JSON.
pub fn write_results_json(
    path: &Path,
    output: &BatchOutput,
    groups: &[GroupSummary],
    config: &AnalysisConfig,
) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export JSON '{}': {e}", path.display())))?;

    let doc = build_export(output, groups, config);
    serde_json::to_writer_pretty(file, &doc)
        .map_err(|e| AppError::new(2, format!("Failed to write export JSON: {e}")))?;

    info!(path = %path.display(), samples = doc.samples.len(), "results exported");
    Ok(())
}
