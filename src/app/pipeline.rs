//! Shared batch pipeline used by the `analyze` and `demo` commands.
//!
//! raw samples -> per-sample analysis (parallel) -> results + isolated failures
//! -> per-group statistics
//!
//! Front-ends only deal with presentation and export.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::analysis::analyze;
use crate::domain::{AnalysisConfig, AnalysisResult, RawSample, Record, TestMode};
use crate::error::{AppError, CurveError};
use crate::stats::{group_statistics, GroupStatistics};

/// A successfully analyzed sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleResult {
    pub name: String,
    pub group: String,
    pub result: AnalysisResult,
}

impl SampleResult {
    pub fn record(&self) -> Record {
        self.result.to_record()
    }
}

/// A sample whose analysis aborted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleFailure {
    pub name: String,
    pub group: String,
    pub error: String,
}

/// Outputs of one batch run. Both lists keep input order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchOutput {
    pub mode: Option<TestMode>,
    pub results: Vec<SampleResult>,
    pub failures: Vec<SampleFailure>,
}

/// Statistics of one group of results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub group: String,
    pub stats: GroupStatistics,
}

/// Analyze every sample in `mode`, isolating per-sample failures.
pub fn analyze_batch(samples: &[RawSample], mode: TestMode, config: &AnalysisConfig) -> Result<BatchOutput, AppError> {
    config
        .validate()
        .map_err(|msg| AppError::new(2, format!("Invalid analysis configuration: {msg}")))?;

    let outcomes: Vec<Result<AnalysisResult, CurveError>> = samples
        .par_iter()
        .map(|s| analyze(&s.strain, &s.stress, mode, config))
        .collect();

    let mut output = BatchOutput {
        mode: Some(mode),
        ..BatchOutput::default()
    };
    for (sample, outcome) in samples.iter().zip(outcomes) {
        match outcome {
            Ok(result) => output.results.push(SampleResult {
                name: sample.name.clone(),
                group: sample.group.clone(),
                result,
            }),
            Err(err) => {
                warn!(sample = %sample.name, group = %sample.group, error = %err, "sample analysis failed");
                output.failures.push(SampleFailure {
                    name: sample.name.clone(),
                    group: sample.group.clone(),
                    error: err.to_string(),
                });
            }
        }
    }

    info!(
        mode = mode.display_name(),
        analyzed = output.results.len(),
        failed = output.failures.len(),
        "batch analysis finished"
    );
    Ok(output)
}

/// Re-run a batch from its raw samples with a new configuration.
///
/// The previous output is discarded; nothing from it is reused.
pub fn recompute(samples: &[RawSample], previous: &BatchOutput, config: &AnalysisConfig) -> Result<BatchOutput, AppError> {
    let mode = previous
        .mode
        .ok_or_else(|| AppError::new(4, "Cannot recompute a batch without a test mode."))?;
    info!(samples = samples.len(), "recomputing batch with new configuration");
    analyze_batch(samples, mode, config)
}

/// Per-group statistics over successful results, groups sorted by label.
///
/// Tension results are grouped by their group label (the source file);
/// compression results by sample name.
pub fn summarize_groups(output: &BatchOutput) -> Vec<GroupSummary> {
    let mut groups: BTreeMap<&str, Vec<Record>> = BTreeMap::new();
    for r in &output.results {
        let key = match r.result.mode() {
            TestMode::Tension => r.group.as_str(),
            TestMode::Compression => r.name.as_str(),
        };
        groups.entry(key).or_default().push(r.record());
    }

    groups
        .into_iter()
        .map(|(group, records)| GroupSummary {
            group: group.to_string(),
            stats: group_statistics(&records),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{generate_batch, TensileCurveSpec};
    use crate::domain::KEY_E_EFF;

    fn batch_with_bad_sample() -> Vec<RawSample> {
        let mut samples = generate_batch("M1", 3, &TensileCurveSpec::default(), 5).unwrap();
        samples.insert(1, RawSample::new("broken", "M1", vec![0.0, 0.1], vec![0.0, 1.0]));
        samples
    }

    #[test]
    fn failures_are_isolated_and_order_kept() {
        let samples = batch_with_bad_sample();
        let out = analyze_batch(&samples, TestMode::Tension, &AnalysisConfig::default()).unwrap();

        let names: Vec<&str> = out.results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["M1-01", "M1-02", "M1-03"]);
        assert_eq!(out.failures.len(), 1);
        assert_eq!(out.failures[0].name, "broken");
        assert!(out.failures[0].error.contains("insufficient data points"));
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let config = AnalysisConfig {
            elastic_lower_ratio: 0.5,
            elastic_upper_ratio: 0.4,
            ..AnalysisConfig::default()
        };
        let err = analyze_batch(&[], TestMode::Tension, &config).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn recompute_matches_fresh_analysis() {
        let samples = batch_with_bad_sample();
        let first = analyze_batch(&samples, TestMode::Tension, &AnalysisConfig::default()).unwrap();

        let config = AnalysisConfig {
            smooth_window: 21,
            ..AnalysisConfig::default()
        };
        let again = recompute(&samples, &first, &config).unwrap();
        let fresh = analyze_batch(&samples, TestMode::Tension, &config).unwrap();
        assert_eq!(again.results, fresh.results);
        assert_eq!(again.failures, fresh.failures);
    }

    #[test]
    fn tension_groups_by_label() {
        let mut samples = generate_batch("A", 2, &TensileCurveSpec::default(), 1).unwrap();
        samples.extend(generate_batch("B", 3, &TensileCurveSpec::default(), 2).unwrap());
        let out = analyze_batch(&samples, TestMode::Tension, &AnalysisConfig::default()).unwrap();

        let groups = summarize_groups(&out);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].group, "A");
        assert_eq!(groups[0].stats.count, 2);
        assert_eq!(groups[1].stats.count, 3);
        let e_eff = groups[1].stats.get(KEY_E_EFF).unwrap();
        assert!(e_eff.mean > 10.0 && e_eff.mean < 30.0, "E_eff mean = {}", e_eff.mean);
    }

    #[test]
    fn compression_groups_by_sample_name() {
        let samples = vec![
            RawSample::new("C1", "file", vec![0.0], vec![40.0]),
            RawSample::new("C2", "file", vec![0.0], vec![50.0]),
        ];
        let out = analyze_batch(&samples, TestMode::Compression, &AnalysisConfig::default()).unwrap();
        let groups = summarize_groups(&out);
        let labels: Vec<&str> = groups.iter().map(|g| g.group.as_str()).collect();
        assert_eq!(labels, ["C1", "C2"]);
    }
}
