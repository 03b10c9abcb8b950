//! Stress–strain curve analysis.
//!
//! Each entry point takes raw strain/stress arrays and returns typed metrics:
//!
//! 1. validate: drop non-finite pairs, sort by strain, dedup, check spans
//! 2. prepare: normalize percent strain and smooth stress
//! 3. mode-specific feature extraction (`tension` or `compression`)
//!
//! Compression records with at most three points skip steps 1–2 and are
//! evaluated verbatim.

pub mod compression;
pub mod curve;
pub mod modulus;
pub mod tension;
pub mod validate;

use crate::domain::{AnalysisConfig, AnalysisResult, CompressiveMetrics, TensileMetrics, TestMode};
use crate::error::CurveError;

use curve::PreparedCurve;

/// Largest compression record that is analyzed without validation.
pub const COMPRESSION_PASSTHROUGH_MAX: usize = 3;

/// Full tension analysis of one raw curve.
pub fn analyze_tension(strain: &[f64], stress: &[f64], config: &AnalysisConfig) -> Result<TensileMetrics, CurveError> {
    let validated = validate::validate_and_sort(strain, stress)?;
    let curve = PreparedCurve::from_validated(validated, config);
    Ok(tension::analyze_tension_curve(&curve, config))
}

/// Compression analysis of one raw curve.
pub fn analyze_compression(
    strain: &[f64],
    stress: &[f64],
    config: &AnalysisConfig,
) -> Result<CompressiveMetrics, CurveError> {
    validate::check_dimensions(strain, stress)?;

    let curve = if strain.len() <= COMPRESSION_PASSTHROUGH_MAX {
        PreparedCurve::passthrough(strain, stress)
    } else {
        let validated = validate::validate_and_sort(strain, stress)?;
        PreparedCurve::from_validated(validated, config)
    };
    Ok(compression::analyze_compression_curve(&curve))
}

/// Analyze a curve in the given test mode.
pub fn analyze(
    strain: &[f64],
    stress: &[f64],
    mode: TestMode,
    config: &AnalysisConfig,
) -> Result<AnalysisResult, CurveError> {
    match mode {
        TestMode::Tension => analyze_tension(strain, stress, config).map(AnalysisResult::Tension),
        TestMode::Compression => analyze_compression(strain, stress, config).map(AnalysisResult::Compression),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{generate_tensile_curve, TensileCurveSpec};
    use crate::error::InsufficientStage;

    #[test]
    fn analysis_is_deterministic() {
        let s = generate_tensile_curve("a", "g", &TensileCurveSpec::default(), 3).unwrap();
        let config = AnalysisConfig::default();
        let a = analyze(&s.strain, &s.stress, TestMode::Tension, &config).unwrap();
        let b = analyze(&s.strain, &s.stress, TestMode::Tension, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn tension_indices_are_ordered() {
        let spec = TensileCurveSpec {
            crack_drops: 4,
            ..TensileCurveSpec::default()
        };
        let config = AnalysisConfig::default();
        for seed in 0..5 {
            let s = generate_tensile_curve("a", "g", &spec, seed).unwrap();
            let m = analyze_tension(&s.strain, &s.stress, &config).unwrap();
            assert!(m.idx_cr <= m.idx_peak, "seed {seed}: {} > {}", m.idx_cr, m.idx_peak);
            assert!(m.idx_peak <= m.idx_u, "seed {seed}: {} > {}", m.idx_peak, m.idx_u);
            assert!(m.idx_u < s.strain.len());
            assert!(m.e_eff >= 0.0);
            assert!(m.crack_stress <= m.ultimate_stress + 1e-9);
        }
    }

    #[test]
    fn shuffled_input_gives_same_result() {
        let s = generate_tensile_curve("a", "g", &TensileCurveSpec::default(), 9).unwrap();
        let config = AnalysisConfig::default();
        let ordered = analyze_tension(&s.strain, &s.stress, &config).unwrap();

        let mut strain = s.strain.clone();
        let mut stress = s.stress.clone();
        strain.reverse();
        stress.reverse();
        let reversed = analyze_tension(&strain, &stress, &config).unwrap();
        assert_eq!(ordered, reversed);
    }

    #[test]
    fn tension_rejects_short_records() {
        let err = analyze_tension(&[0.0, 0.1, 0.2], &[0.0, 1.0, 2.0], &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            CurveError::InsufficientData {
                stage: InsufficientStage::Raw,
                count: 3,
                ..
            }
        ));
    }

    #[test]
    fn mismatched_lengths_fail_in_both_modes() {
        let config = AnalysisConfig::default();
        for mode in [TestMode::Tension, TestMode::Compression] {
            let err = analyze(&[0.0, 0.1], &[1.0], mode, &config).unwrap_err();
            assert!(matches!(err, CurveError::DimensionMismatch { strain: 2, stress: 1 }));
        }
    }

    #[test]
    fn result_mode_matches_request() {
        let config = AnalysisConfig::default();
        let r = analyze(&[0.0, 0.001], &[0.0, 10.0], TestMode::Compression, &config).unwrap();
        assert_eq!(r.mode(), TestMode::Compression);
    }
}
