//! Shared curve construction: unit normalization, smoothing, peak location.

use tracing::debug;

use crate::analysis::validate::ValidatedCurve;
use crate::domain::AnalysisConfig;
use crate::math::savgol_filter;

/// Polynomial order of the stress smoothing filter.
pub const SMOOTH_POLYORDER: usize = 3;

/// Strain maxima above this are interpreted as percent strain.
const PERCENT_STRAIN_THRESHOLD: f64 = 1.0;

/// Curve shared by every stage after validation.
///
/// `strain` is in absolute units, `stress` is the validated (unsmoothed)
/// series, and `smooth` is the denoised stress used by derivative-sensitive
/// stages. All three have the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedCurve {
    pub strain: Vec<f64>,
    pub stress: Vec<f64>,
    pub smooth: Vec<f64>,
}

/// Peak of the smoothed stress series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    pub idx: usize,
    /// Smoothed stress at `idx`.
    pub stress: f64,
    /// Raw strain at `idx`.
    pub strain: f64,
}

impl PreparedCurve {
    /// Normalize units and smooth a validated curve.
    pub fn from_validated(curve: ValidatedCurve, config: &AnalysisConfig) -> Self {
        let (strain, stress) = curve.into_parts();
        let strain = normalize_strain_units(strain);
        let smooth = smooth_stress(&stress, config.odd_smooth_window());
        Self { strain, stress, smooth }
    }

    /// Keep raw values verbatim (no cleaning, no normalization, no smoothing).
    ///
    /// Used for ultra-short compression records, which are usually one to three
    /// summary values rather than a curve.
    pub fn passthrough(strain: &[f64], stress: &[f64]) -> Self {
        Self {
            strain: strain.to_vec(),
            stress: stress.to_vec(),
            smooth: stress.to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.stress.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stress.is_empty()
    }

    /// Index and value of the maximum smoothed stress.
    ///
    /// The first maximum wins on ties; non-finite values are skipped.
    /// An empty curve yields `(0, 0.0, 0.0)`.
    pub fn peak(&self) -> Peak {
        let Some(idx) = argmax(&self.smooth) else {
            return Peak {
                idx: 0,
                stress: 0.0,
                strain: 0.0,
            };
        };
        Peak {
            idx,
            stress: self.smooth[idx],
            strain: self.strain.get(idx).copied().unwrap_or(0.0),
        }
    }
}

/// Divide strain by 100 when it looks like percent strain.
pub fn normalize_strain_units(strain: Vec<f64>) -> Vec<f64> {
    let max = strain.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max > PERCENT_STRAIN_THRESHOLD {
        strain.into_iter().map(|e| e / 100.0).collect()
    } else {
        strain
    }
}

/// Savitzky–Golay smoothed stress, or a raw copy when the curve is not longer
/// than the window or the filter fails.
pub fn smooth_stress(stress: &[f64], window: usize) -> Vec<f64> {
    if stress.len() <= window {
        return stress.to_vec();
    }
    match savgol_filter(stress, window, SMOOTH_POLYORDER) {
        Some(smooth) => smooth,
        None => {
            debug!(window, len = stress.len(), "stress smoothing failed; using raw copy");
            stress.to_vec()
        }
    }
}

/// First index of the largest finite value.
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if !v.is_finite() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::validate::validate_and_sort;

    #[test]
    fn percent_strain_is_converted() {
        let strain = normalize_strain_units(vec![0.0, 0.5, 1.5, 2.0]);
        assert_eq!(strain, vec![0.0, 0.005, 0.015, 0.02]);

        let absolute = normalize_strain_units(vec![0.0, 0.01, 0.02]);
        assert_eq!(absolute, vec![0.0, 0.01, 0.02]);
    }

    #[test]
    fn short_curves_are_not_smoothed() {
        let stress = vec![1.0, 3.0, 2.0, 5.0, 4.0];
        assert_eq!(smooth_stress(&stress, 11), stress);
        assert_eq!(smooth_stress(&stress, 5), stress);
    }

    #[test]
    fn prepared_curve_keeps_lengths_aligned() {
        let strain: Vec<f64> = (0..40).map(|i| i as f64 * 0.05).collect();
        let stress: Vec<f64> = (0..40).map(|i| (i as f64 * 0.3).sin() + 2.0).collect();
        let curve = validate_and_sort(&strain, &stress).unwrap();
        let prepared = PreparedCurve::from_validated(curve, &AnalysisConfig::default());
        assert_eq!(prepared.strain.len(), 40);
        assert_eq!(prepared.smooth.len(), 40);
        // Max strain 1.95 > 1.0, so the curve was treated as percent.
        assert!((prepared.strain[39] - 0.0195).abs() < 1e-12);
    }

    #[test]
    fn peak_prefers_first_maximum() {
        let curve = PreparedCurve::passthrough(&[0.1, 0.2, 0.3, 0.4], &[1.0, 4.0, 4.0, 2.0]);
        let peak = curve.peak();
        assert_eq!(peak.idx, 1);
        assert_eq!(peak.stress, 4.0);
        assert_eq!(peak.strain, 0.2);
    }

    #[test]
    fn empty_curve_peak_is_zero() {
        let curve = PreparedCurve::passthrough(&[], &[]);
        assert_eq!(
            curve.peak(),
            Peak {
                idx: 0,
                stress: 0.0,
                strain: 0.0
            }
        );
    }
}
