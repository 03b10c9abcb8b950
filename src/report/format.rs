//! Formatted terminal output.
//!
//! Formatting is kept in one place so the analysis code stays free of
//! presentation concerns and output changes stay localized.

use crate::app::pipeline::{BatchOutput, GroupSummary, SampleResult};
use crate::domain::{
    AnalysisConfig, AnalysisResult, TestMode, KEY_CRACK_STRESS, KEY_E_EFF, KEY_E_INIT, KEY_FRACTURE_ENERGY,
    KEY_HARDENING_CAPACITY, KEY_PEAK_STRAIN, KEY_PEAK_STRESS, KEY_PLATEAU_CV, KEY_STRAIN_ENERGY,
    KEY_ULTIMATE_STRAIN, KEY_ULTIMATE_STRESS,
};

const NAME_WIDTH: usize = 20;

/// Column label, record key, and decimals for each reported metric.
const TENSION_COLUMNS: &[(&str, &str, usize)] = &[
    ("E_eff", KEY_E_EFF, 2),
    ("E_init", KEY_E_INIT, 2),
    ("f_cr", KEY_CRACK_STRESS, 2),
    ("f_u", KEY_ULTIMATE_STRESS, 2),
    ("eps_u%", KEY_ULTIMATE_STRAIN, 3),
    ("g", KEY_STRAIN_ENERGY, 1),
    ("G_F", KEY_FRACTURE_ENERGY, 2),
    ("HC%", KEY_HARDENING_CAPACITY, 3),
    ("CV", KEY_PLATEAU_CV, 3),
];

const COMPRESSION_COLUMNS: &[(&str, &str, usize)] = &[
    ("E_sec", KEY_E_EFF, 2),
    ("f_c", KEY_PEAK_STRESS, 2),
    ("eps_c%", KEY_PEAK_STRAIN, 3),
];

fn columns(mode: TestMode) -> &'static [(&'static str, &'static str, usize)] {
    match mode {
        TestMode::Tension => TENSION_COLUMNS,
        TestMode::Compression => COMPRESSION_COLUMNS,
    }
}

/// Header block: mode, sample counts and active thresholds.
pub fn format_batch_summary(output: &BatchOutput, config: &AnalysisConfig) -> String {
    let mut out = String::new();
    let mode = output.mode.map_or("-", TestMode::display_name);

    out.push_str(&format!("=== ecc - {mode} Analysis ===\n"));
    out.push_str(&format!(
        "Samples: {} analyzed | {} failed\n",
        output.results.len(),
        output.failures.len()
    ));
    out.push_str(&format!(
        "Config: window={} band=[{:.2}, {:.2}] ultimate={:.2} gauge={:.1}mm crack_tol={:.3}MPa\n",
        config.odd_smooth_window(),
        config.elastic_lower_ratio,
        config.elastic_upper_ratio,
        config.ultimate_strain_ratio,
        config.gauge_length_mm,
        config.crack_tolerance_base,
    ));
    out
}

/// Per-sample metric table.
pub fn format_results_table(results: &[SampleResult]) -> String {
    let Some(first) = results.first() else {
        return "No results.\n".to_string();
    };
    let cols = columns(first.result.mode());

    let mut out = String::new();
    out.push_str(&header_line("sample", cols.iter().map(|c| c.0)));
    out.push_str(&rule_line(cols.len()));

    for r in results {
        let record = r.record();
        let mut line = format!("{:<NAME_WIDTH$}", truncate(&r.name, NAME_WIDTH));
        for &(_, key, decimals) in cols {
            line.push_str(&format!(" {:>10}", fmt_metric(record.get(key).and_then(|v| v.as_f64()), decimals)));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Group table with `mean ± sd` per metric.
pub fn format_group_table(groups: &[GroupSummary], mode: TestMode) -> String {
    if groups.is_empty() {
        return String::new();
    }
    let cols = columns(mode);

    let mut out = String::new();
    out.push_str(&format!("{:<NAME_WIDTH$} {:>3}", "group", "n"));
    for (label, _, _) in cols {
        out.push_str(&format!(" {label:>18}"));
    }
    out.push('\n');
    out.push_str(&format!("{:-<NAME_WIDTH$} {:-<3}", "", ""));
    for _ in cols {
        out.push_str(&format!(" {:-<18}", ""));
    }
    out.push('\n');

    for g in groups {
        let mut line = format!("{:<NAME_WIDTH$} {:>3}", truncate(&g.group, NAME_WIDTH), g.stats.count);
        for &(_, key, decimals) in cols {
            let cell = match g.stats.get(key) {
                Some(s) => format!("{:.prec$} ± {:.prec$}", s.mean, s.sd, prec = decimals),
                None => "-".to_string(),
            };
            line.push_str(&format!(" {cell:>18}"));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// One line per failed sample.
pub fn format_failures(output: &BatchOutput) -> String {
    let mut out = String::new();
    if output.failures.is_empty() {
        return out;
    }
    out.push_str("Failed samples:\n");
    for f in &output.failures {
        out.push_str(&format!("- {} [{}]: {}\n", f.name, f.group, f.error));
    }
    out
}

/// Full report: summary, results, groups, failures.
pub fn format_report(output: &BatchOutput, groups: &[GroupSummary], config: &AnalysisConfig) -> String {
    let mut out = format_batch_summary(output, config);
    out.push('\n');
    out.push_str(&format_results_table(&output.results));
    if let Some(mode) = output.mode.filter(|_| !groups.is_empty()) {
        out.push_str("\nGroup statistics (mean ± SD):\n");
        out.push_str(&format_group_table(groups, mode));
    }
    let failures = format_failures(output);
    if !failures.is_empty() {
        out.push('\n');
        out.push_str(&failures);
    }
    out
}

/// One-line description of a single result, for log output.
pub fn describe_result(result: &AnalysisResult) -> String {
    match result {
        AnalysisResult::Tension(m) => format!(
            "E_eff={:.2}GPa f_cr={:.2}MPa f_u={:.2}MPa eps_u={:.3}%",
            m.e_eff / 1000.0,
            m.crack_stress,
            m.ultimate_stress,
            m.ultimate_strain * 100.0
        ),
        AnalysisResult::Compression(m) => format!(
            "E_sec={:.2}GPa f_c={:.2}MPa eps_c={:.3}%",
            m.e_secant / 1000.0,
            m.peak_stress,
            m.peak_strain * 100.0
        ),
    }
}

fn header_line<'a>(first: &str, labels: impl Iterator<Item = &'a str>) -> String {
    let mut line = format!("{first:<NAME_WIDTH$}");
    for label in labels {
        line.push_str(&format!(" {label:>10}"));
    }
    line.push('\n');
    line
}

fn rule_line(n: usize) -> String {
    let mut line = format!("{:-<NAME_WIDTH$}", "");
    for _ in 0..n {
        line.push_str(&format!(" {:-<10}", ""));
    }
    line.push('\n');
    line
}

fn fmt_metric(v: Option<f64>, decimals: usize) -> String {
    match v {
        Some(v) if v.is_finite() => format!("{v:.decimals$}"),
        _ => "-".to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
