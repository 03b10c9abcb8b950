//! Elastic modulus estimators.
//!
//! Two independent strategies:
//! - **effective modulus**: least squares line through the pre-peak points
//!   whose stress falls in a mid-range band of the peak
//! - **initial modulus**: robust statistic over the near-origin part of the
//!   tangent-modulus profile
//!
//! Moduli are in stress units per unit strain (MPa for MPa stress).

use tracing::debug;

use crate::analysis::curve::{Peak, PreparedCurve};
use crate::analysis::validate::MIN_POINTS;
use crate::domain::AnalysisConfig;
use crate::math::{gradient, linear_fit, savgol_filter};

/// Band used when the configured regression band holds fewer than 3 points.
const FALLBACK_BAND: (f64, f64) = (0.05, 0.50);

/// Minimum number of points for the elastic regression.
const MIN_FIT_POINTS: usize = 3;

/// Fraction of the tangent profile searched for the initial modulus.
const INITIAL_SEARCH_FRACTION: f64 = 0.3;

/// Fraction of the surviving tangent values averaged for the initial modulus.
const INITIAL_TOP_FRACTION: f64 = 0.1;

/// Physically plausible tangent moduli (1–60 GPa in MPa).
///
/// Values outside are noise or testing-machine stiffness artifacts.
const PLAUSIBLE_MODULUS: (f64, f64) = (1_000.0, 60_000.0);

/// Elastic regression line `stress = slope * strain + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ElasticFit {
    pub slope: f64,
    pub intercept: f64,
}

impl ElasticFit {
    pub fn stress_at(&self, strain: f64) -> f64 {
        self.slope * strain + self.intercept
    }
}

/// Effective modulus by band-limited linear regression over `[0, idx_peak)`.
///
/// Falls back to the wider 5%–50% band when the configured band holds fewer
/// than 3 points. Returns a zero line when the fit is infeasible. The slope is
/// floored at zero.
pub fn effective_modulus(curve: &PreparedCurve, peak: &Peak, config: &AnalysisConfig) -> ElasticFit {
    if curve.len() < MIN_POINTS || peak.stress <= 0.0 {
        return ElasticFit::default();
    }

    let end = peak.idx.min(curve.len());
    let strain = &curve.strain[..end];
    let stress = &curve.stress[..end];

    let mut band = select_band(
        strain,
        stress,
        config.elastic_lower_ratio * peak.stress,
        config.elastic_upper_ratio * peak.stress,
    );
    if band.0.len() < MIN_FIT_POINTS {
        band = select_band(
            strain,
            stress,
            FALLBACK_BAND.0 * peak.stress,
            FALLBACK_BAND.1 * peak.stress,
        );
    }

    let (x, y) = band;
    if x.len() < MIN_FIT_POINTS {
        debug!(points = x.len(), "too few points in elastic band; modulus set to 0");
        return ElasticFit::default();
    }

    match linear_fit(&x, &y) {
        Some((slope, intercept)) => ElasticFit {
            slope: slope.max(0.0),
            intercept,
        },
        None => {
            debug!("elastic regression failed; modulus set to 0");
            ElasticFit::default()
        }
    }
}

fn select_band(strain: &[f64], stress: &[f64], lo: f64, hi: f64) -> (Vec<f64>, Vec<f64>) {
    strain
        .iter()
        .zip(stress)
        .filter(|&(_, &s)| s >= lo && s <= hi)
        .map(|(&e, &s)| (e, s))
        .unzip()
}

/// Tangent modulus `d(smoothed stress)/d(strain)` over `[0, idx_peak)`.
///
/// The raw derivative is re-smoothed (order 2, window `max(5, n/10)` forced
/// odd) to suppress differentiation noise. Fewer than 5 pre-peak points give
/// an all-zero profile of length `idx_peak`.
pub fn tangent_modulus_curve(curve: &PreparedCurve, idx_peak: usize) -> Vec<f64> {
    let end = idx_peak.min(curve.len());
    if end < MIN_POINTS {
        return vec![0.0; end];
    }

    let Some(raw) = gradient(&curve.smooth[..end], &curve.strain[..end]) else {
        return vec![0.0; end];
    };
    let raw: Vec<f64> = raw
        .into_iter()
        .map(|v| if v.is_finite() { v } else { 0.0 })
        .collect();

    let mut window = (raw.len() / 10).max(5);
    if window % 2 == 0 {
        window += 1;
    }
    savgol_filter(&raw, window, 2).unwrap_or(raw)
}

/// Robust near-origin modulus from a tangent profile.
///
/// Searches the first 30% (at least 5 values), keeps values strictly inside the
/// plausible band and averages the top 10% (at least one). Returns 0 when no
/// value survives; callers then fall back to the effective modulus.
pub fn initial_modulus(tangent: &[f64]) -> f64 {
    if tangent.is_empty() {
        return 0.0;
    }

    let limit = ((tangent.len() as f64 * INITIAL_SEARCH_FRACTION) as usize)
        .max(MIN_POINTS)
        .min(tangent.len());

    let mut valid: Vec<f64> = tangent[..limit]
        .iter()
        .copied()
        .filter(|&v| v > PLAUSIBLE_MODULUS.0 && v < PLAUSIBLE_MODULUS.1)
        .collect();
    if valid.is_empty() {
        return 0.0;
    }

    valid.sort_by(|a, b| b.total_cmp(a));
    let take = ((valid.len() as f64 * INITIAL_TOP_FRACTION) as usize).max(1);
    valid[..take].iter().sum::<f64>() / take as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_curve(n: usize, modulus: f64, max_strain: f64) -> PreparedCurve {
        let strain: Vec<f64> = (0..n).map(|i| max_strain * i as f64 / (n - 1) as f64).collect();
        let stress: Vec<f64> = strain.iter().map(|&e| modulus * e).collect();
        PreparedCurve {
            strain,
            smooth: stress.clone(),
            stress,
        }
    }

    #[test]
    fn effective_modulus_recovers_perfect_line() {
        let curve = line_curve(101, 20_000.0, 0.02);
        let peak = curve.peak();
        assert_eq!(peak.idx, 100);

        let fit = effective_modulus(&curve, &peak, &AnalysisConfig::default());
        assert!((fit.slope - 20_000.0).abs() / 20_000.0 < 0.01);
        assert!(fit.intercept.abs() < 1e-6);
    }

    #[test]
    fn effective_modulus_widens_band_when_sparse() {
        // The 10–40% band of a 100 MPa peak holds one pre-peak point, the 5–50% band three.
        let strain = vec![0.0, 0.001, 0.002, 0.003, 0.0045, 0.006, 0.007];
        let stress = vec![0.0, 8.0, 30.0, 48.0, 70.0, 100.0, 90.0];
        let curve = PreparedCurve {
            strain,
            smooth: stress.clone(),
            stress,
        };
        let peak = curve.peak();
        let fit = effective_modulus(&curve, &peak, &AnalysisConfig::default());
        assert!(fit.slope > 0.0);
    }

    #[test]
    fn effective_modulus_is_zero_without_band_points() {
        let strain = vec![0.0, 0.001, 0.002, 0.003, 0.004, 0.005];
        let stress = vec![0.0, 1.0, 90.0, 95.0, 100.0, 98.0];
        let curve = PreparedCurve {
            strain,
            smooth: stress.clone(),
            stress,
        };
        let peak = curve.peak();
        assert_eq!(
            effective_modulus(&curve, &peak, &AnalysisConfig::default()),
            ElasticFit::default()
        );
    }

    #[test]
    fn negative_slope_is_floored() {
        let strain = vec![0.0, 0.001, 0.002, 0.003, 0.004, 0.005, 0.006];
        let stress = vec![100.0, 30.0, 25.0, 20.0, 15.0, 10.0, 5.0];
        let curve = PreparedCurve {
            strain,
            smooth: stress.clone(),
            stress,
        };
        // Force the peak to the end so the falling segment is "pre-peak".
        let peak = Peak {
            idx: 6,
            stress: 100.0,
            strain: 0.006,
        };
        let fit = effective_modulus(&curve, &peak, &AnalysisConfig::default());
        assert_eq!(fit.slope, 0.0);
    }

    #[test]
    fn tangent_curve_is_constant_on_a_line() {
        let curve = line_curve(60, 20_000.0, 0.006);
        let tangent = tangent_modulus_curve(&curve, 59);
        assert_eq!(tangent.len(), 59);
        assert!(tangent.iter().all(|v| (v - 20_000.0).abs() < 1e-6));
    }

    #[test]
    fn short_pre_peak_segment_gives_zero_tangent() {
        let curve = line_curve(10, 20_000.0, 0.001);
        assert_eq!(tangent_modulus_curve(&curve, 4), vec![0.0; 4]);
    }

    #[test]
    fn initial_modulus_filters_implausible_values() {
        let mut tangent = vec![90_000.0, 500.0, 30_000.0, 28_000.0, 26_000.0];
        tangent.extend(std::iter::repeat(10_000.0).take(15));
        // First max(5, 6) = 6 values searched; plausible: 30k, 28k, 26k, 10k.
        assert!((initial_modulus(&tangent) - 30_000.0).abs() < 1e-9);
    }

    #[test]
    fn initial_modulus_zero_when_nothing_plausible() {
        assert_eq!(initial_modulus(&[0.0; 20]), 0.0);
        assert_eq!(initial_modulus(&[]), 0.0);
    }
}
