//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during analysis
//! - exported to JSON
//! - flattened into metric records for group statistics

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Flat metric record: unit-labeled metric name -> value.
///
/// Keys starting with `_` are internal (positional indices, regression
/// intercept) and are skipped by the group aggregator.
pub type Record = serde_json::Map<String, Value>;

pub const KEY_E_EFF: &str = "E_eff (GPa)";
pub const KEY_E_INIT: &str = "E_init (GPa)";
pub const KEY_CRACK_STRESS: &str = "First Crack Strength (MPa)";
pub const KEY_ULTIMATE_STRESS: &str = "Ultimate Stress (MPa)";
pub const KEY_ULTIMATE_STRAIN: &str = "Ultimate Strain (%)";
pub const KEY_STRAIN_ENERGY: &str = "Strain Energy (kJ/m³)";
pub const KEY_FRACTURE_ENERGY: &str = "Fracture Energy (kJ/m²)";
pub const KEY_HARDENING_CAPACITY: &str = "Hardening Capacity (%)";
pub const KEY_PLATEAU_CV: &str = "Plateau Stability (CV)";
pub const KEY_PEAK_STRESS: &str = "Peak Stress (MPa)";
pub const KEY_PEAK_STRAIN: &str = "Peak Strain (%)";

pub const KEY_IDX_PEAK: &str = "_idx_peak";
pub const KEY_IDX_CR: &str = "_idx_cr";
pub const KEY_IDX_U: &str = "_idx_u";
pub const KEY_E_INTERCEPT: &str = "_E_intercept";

/// Loading mode of a test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TestMode {
    /// Uniaxial tension: full crack / hardening / ultimate analysis.
    Tension,
    /// Compression: peak strength and 30% secant modulus.
    Compression,
}

impl TestMode {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            TestMode::Tension => "Tensile",
            TestMode::Compression => "Compressive",
        }
    }
}

/// A raw curve as handed over by the loader.
///
/// `strain` and `stress` are parallel sequences in arbitrary units; they may
/// contain non-finite values and duplicate or unsorted strain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSample {
    pub name: String,
    /// Grouping label (usually the source file).
    pub group: String,
    pub strain: Vec<f64>,
    pub stress: Vec<f64>,
}

impl RawSample {
    pub fn new(name: impl Into<String>, group: impl Into<String>, strain: Vec<f64>, stress: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
            strain,
            stress,
        }
    }
}

/// Numeric thresholds that drive the analysis.
///
/// Owned by the caller and passed into every analysis call; the engine never
/// mutates it. Persisted form uses upper-case keys (`SMOOTH_WINDOW`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct AnalysisConfig {
    /// Savitzky–Golay window for stress smoothing (forced odd).
    pub smooth_window: usize,
    /// Lower bound of the elastic regression band, as a fraction of peak stress.
    pub elastic_lower_ratio: f64,
    /// Upper bound of the elastic regression band, as a fraction of peak stress.
    pub elastic_upper_ratio: f64,
    /// Post-peak stress ratio below which the specimen is considered failed.
    pub ultimate_strain_ratio: f64,
    /// Gauge length used to scale strain energy into fracture energy.
    pub gauge_length_mm: f64,
    /// Minimum absolute deviation (MPa) from the elastic line that counts as cracking.
    pub crack_tolerance_base: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            smooth_window: 11,
            elastic_lower_ratio: 0.10,
            elastic_upper_ratio: 0.40,
            ultimate_strain_ratio: 0.85,
            gauge_length_mm: 80.0,
            crack_tolerance_base: 0.05,
        }
    }
}

impl AnalysisConfig {
    /// Smoothing window forced to the next odd value.
    pub fn odd_smooth_window(&self) -> usize {
        if self.smooth_window % 2 == 0 {
            self.smooth_window + 1
        } else {
            self.smooth_window
        }
    }

    /// Check that every threshold is physically meaningful.
    pub fn validate(&self) -> Result<(), String> {
        if self.smooth_window == 0 {
            return Err("SMOOTH_WINDOW must be >= 1.".to_string());
        }
        let lower = self.elastic_lower_ratio;
        let upper = self.elastic_upper_ratio;
        if !(lower.is_finite() && upper.is_finite() && lower >= 0.0 && upper <= 1.0 && lower < upper) {
            return Err(format!(
                "Elastic band must satisfy 0 <= lower < upper <= 1 (got {lower} .. {upper})."
            ));
        }
        let ratio = self.ultimate_strain_ratio;
        if !(ratio.is_finite() && ratio > 0.0 && ratio <= 1.0) {
            return Err(format!("ULTIMATE_STRAIN_RATIO must be in (0, 1] (got {ratio})."));
        }
        if !(self.gauge_length_mm.is_finite() && self.gauge_length_mm > 0.0) {
            return Err(format!("GAUGE_LENGTH_MM must be > 0 (got {}).", self.gauge_length_mm));
        }
        if !(self.crack_tolerance_base.is_finite() && self.crack_tolerance_base >= 0.0) {
            return Err(format!(
                "CRACK_TOLERANCE_BASE must be >= 0 (got {}).",
                self.crack_tolerance_base
            ));
        }
        Ok(())
    }
}

/// Tension metrics for a single sample.
///
/// Moduli are stored in the curve's native units (MPa per unit strain);
/// conversion to GPa and percent happens in [`TensileMetrics::to_record`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TensileMetrics {
    pub e_eff: f64,
    pub e_init: f64,
    pub e_intercept: f64,
    pub crack_stress: f64,
    pub ultimate_stress: f64,
    /// Absolute strain at the ultimate state.
    pub ultimate_strain: f64,
    /// Strain energy density (kJ/m³).
    pub strain_energy: f64,
    /// Fracture energy (kJ/m²).
    pub fracture_energy: f64,
    /// Absolute strain between crack and ultimate points.
    pub hardening_capacity: f64,
    pub plateau_cv: f64,
    pub idx_peak: usize,
    pub idx_cr: usize,
    pub idx_u: usize,
}

impl TensileMetrics {
    pub fn to_record(&self) -> Record {
        let mut out = Record::new();
        out.insert(KEY_E_EFF.into(), Value::from(self.e_eff / 1000.0));
        out.insert(KEY_E_INIT.into(), Value::from(self.e_init / 1000.0));
        out.insert(KEY_CRACK_STRESS.into(), Value::from(self.crack_stress));
        out.insert(KEY_ULTIMATE_STRESS.into(), Value::from(self.ultimate_stress));
        out.insert(KEY_ULTIMATE_STRAIN.into(), Value::from(self.ultimate_strain * 100.0));
        out.insert(KEY_STRAIN_ENERGY.into(), Value::from(self.strain_energy));
        out.insert(KEY_FRACTURE_ENERGY.into(), Value::from(self.fracture_energy));
        out.insert(KEY_HARDENING_CAPACITY.into(), Value::from(self.hardening_capacity * 100.0));
        out.insert(KEY_PLATEAU_CV.into(), Value::from(self.plateau_cv));
        out.insert(KEY_IDX_PEAK.into(), Value::from(self.idx_peak));
        out.insert(KEY_IDX_CR.into(), Value::from(self.idx_cr));
        out.insert(KEY_IDX_U.into(), Value::from(self.idx_u));
        out.insert(KEY_E_INTERCEPT.into(), Value::from(self.e_intercept));
        out
    }
}

/// Compression metrics for a single sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressiveMetrics {
    /// Secant modulus at 30% of peak (MPa per unit strain).
    pub e_secant: f64,
    pub peak_stress: f64,
    /// Absolute strain at peak.
    pub peak_strain: f64,
    pub idx_peak: usize,
}

impl CompressiveMetrics {
    pub fn to_record(&self) -> Record {
        let mut out = Record::new();
        out.insert(KEY_E_EFF.into(), Value::from(self.e_secant / 1000.0));
        out.insert(KEY_PEAK_STRESS.into(), Value::from(self.peak_stress));
        out.insert(KEY_PEAK_STRAIN.into(), Value::from(self.peak_strain * 100.0));
        out.insert(KEY_IDX_PEAK.into(), Value::from(self.idx_peak));
        out.insert(KEY_IDX_CR.into(), Value::from(0usize));
        out.insert(KEY_IDX_U.into(), Value::from(self.idx_peak));
        out
    }
}

/// Per-sample analysis output, tagged by test mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnalysisResult {
    Tension(TensileMetrics),
    Compression(CompressiveMetrics),
}

impl AnalysisResult {
    pub fn mode(&self) -> TestMode {
        match self {
            AnalysisResult::Tension(_) => TestMode::Tension,
            AnalysisResult::Compression(_) => TestMode::Compression,
        }
    }

    /// Flatten into the unit-labeled metric mapping.
    pub fn to_record(&self) -> Record {
        match self {
            AnalysisResult::Tension(m) => m.to_record(),
            AnalysisResult::Compression(m) => m.to_record(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid_and_odd() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.odd_smooth_window(), 11);

        let even = AnalysisConfig {
            smooth_window: 10,
            ..config
        };
        assert_eq!(even.odd_smooth_window(), 11);
    }

    #[test]
    fn validate_rejects_inverted_band() {
        let config = AnalysisConfig {
            elastic_lower_ratio: 0.5,
            elastic_upper_ratio: 0.4,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_uses_upper_case_keys() {
        let json = serde_json::to_value(AnalysisConfig::default()).unwrap();
        assert_eq!(json["SMOOTH_WINDOW"], 11);
        assert_eq!(json["GAUGE_LENGTH_MM"], 80.0);
    }

    #[test]
    fn tensile_record_converts_units() {
        let m = TensileMetrics {
            e_eff: 20_000.0,
            e_init: 25_000.0,
            e_intercept: 0.1,
            crack_stress: 3.0,
            ultimate_stress: 5.0,
            ultimate_strain: 0.03,
            strain_energy: 120.0,
            fracture_energy: 9.6,
            hardening_capacity: 0.02,
            plateau_cv: 0.05,
            idx_peak: 10,
            idx_cr: 3,
            idx_u: 12,
        };
        let rec = m.to_record();
        assert_eq!(rec[KEY_E_EFF].as_f64(), Some(20.0));
        assert_eq!(rec[KEY_E_INIT].as_f64(), Some(25.0));
        assert!((rec[KEY_ULTIMATE_STRAIN].as_f64().unwrap() - 3.0).abs() < 1e-12);
        assert!((rec[KEY_HARDENING_CAPACITY].as_f64().unwrap() - 2.0).abs() < 1e-12);
        assert_eq!(rec[KEY_IDX_U].as_u64(), Some(12));
    }
}
