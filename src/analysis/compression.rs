//! Compression analysis: peak strength and 30%-of-peak secant modulus.

use crate::analysis::curve::PreparedCurve;
use crate::domain::CompressiveMetrics;

/// Fraction of peak stress at which the secant modulus is taken.
const SECANT_STRESS_RATIO: f64 = 0.3;

/// Strains at or below this make the secant modulus undefined.
const MIN_SECANT_STRAIN: f64 = 1e-6;

/// Run the compression pipeline.
///
/// Records with at most one point are strength summaries: the single stress
/// value is echoed as peak stress (0 when empty) with zero modulus and strain.
pub fn analyze_compression_curve(curve: &PreparedCurve) -> CompressiveMetrics {
    if curve.len() <= 1 {
        return CompressiveMetrics {
            e_secant: 0.0,
            peak_stress: curve.stress.first().copied().unwrap_or(0.0),
            peak_strain: 0.0,
            idx_peak: 0,
        };
    }

    let peak = curve.peak();
    CompressiveMetrics {
        e_secant: secant_modulus(curve, peak.idx, peak.stress),
        peak_stress: peak.stress,
        peak_strain: peak.strain,
        idx_peak: peak.idx,
    }
}

/// Secant modulus through the pre-peak point whose stress is nearest to 30%
/// of peak (first such point on ties). Zero when there is no pre-peak point or
/// its strain is too small.
pub fn secant_modulus(curve: &PreparedCurve, idx_peak: usize, peak_stress: f64) -> f64 {
    let target = SECANT_STRESS_RATIO * peak_stress;
    let end = idx_peak.min(curve.len());

    let nearest = curve.stress[..end]
        .iter()
        .enumerate()
        .filter(|(_, s)| s.is_finite())
        .min_by(|a, b| (a.1 - target).abs().total_cmp(&(b.1 - target).abs()));

    let Some((idx, &stress_30)) = nearest else {
        return 0.0;
    };
    let strain_30 = curve.strain[idx];
    if strain_30 > MIN_SECANT_STRAIN {
        stress_30 / strain_30
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze_compression;
    use crate::domain::AnalysisConfig;

    #[test]
    fn single_point_echoes_stress() {
        let m = analyze_compression(&[0.0], &[42.0], &AnalysisConfig::default()).unwrap();
        assert_eq!(m.peak_stress, 42.0);
        assert_eq!(m.e_secant, 0.0);
        assert_eq!(m.peak_strain, 0.0);
    }

    #[test]
    fn empty_record_reports_zero() {
        let m = analyze_compression(&[], &[], &AnalysisConfig::default()).unwrap();
        assert_eq!(m.peak_stress, 0.0);
    }

    #[test]
    fn short_records_bypass_validation() {
        // Duplicate, unsorted strain would fail validation; here it is kept verbatim.
        let m = analyze_compression(&[0.002, 0.001, 0.001], &[30.0, 10.0, 45.0], &AnalysisConfig::default())
            .unwrap();
        assert_eq!(m.idx_peak, 2);
        assert_eq!(m.peak_stress, 45.0);
        // 30% of 45 = 13.5 -> nearest pre-peak stress is 10.0 at strain 0.001.
        assert!((m.e_secant - 10_000.0).abs() < 1e-9);
    }

    #[test]
    fn peak_first_has_no_secant() {
        let m = analyze_compression(&[0.001, 0.002], &[50.0, 20.0], &AnalysisConfig::default()).unwrap();
        assert_eq!(m.idx_peak, 0);
        assert_eq!(m.e_secant, 0.0);
    }

    #[test]
    fn full_curve_secant_modulus() {
        // Linear 30 GPa ramp to 60 MPa at 0.002, then softening.
        let mut strain = Vec::new();
        let mut stress = Vec::new();
        for i in 0..=200 {
            let e = 0.003 * i as f64 / 200.0;
            strain.push(e);
            stress.push(if e <= 0.002 { 30_000.0 * e } else { 60.0 - 20_000.0 * (e - 0.002) });
        }
        let m = analyze_compression(&strain, &stress, &AnalysisConfig::default()).unwrap();
        assert!((m.peak_stress - 60.0).abs() < 0.5);
        assert!((m.peak_strain - 0.002).abs() < 1e-4);
        assert!((m.e_secant - 30_000.0).abs() / 30_000.0 < 0.01, "E_sec = {}", m.e_secant);
    }

    #[test]
    fn tiny_strain_gives_zero_secant() {
        let curve = PreparedCurve::passthrough(&[0.0, 1e-7, 2e-7, 3e-7], &[0.0, 3.0, 6.0, 10.0]);
        assert_eq!(secant_modulus(&curve, 3, 10.0), 0.0);
    }
}
