//! Tension analysis: crack point, ultimate state, energy and hardening metrics.
//!
//! Stages run strictly in order, each consuming the previous stage's output:
//!
//! 1. peak of the smoothed curve
//! 2. effective modulus (band regression) and its intercept
//! 3. tangent-modulus profile and initial modulus, floored at the effective modulus
//! 4. first crack (limit of proportionality)
//! 5. ultimate state (sustained post-peak drop)
//! 6. strain energy up to the ultimate state
//! 7. derived metrics (fracture energy, hardening capacity, plateau CV)

use tracing::debug;

use crate::analysis::curve::{Peak, PreparedCurve};
use crate::analysis::modulus::{effective_modulus, initial_modulus, tangent_modulus_curve, ElasticFit};
use crate::domain::{AnalysisConfig, TensileMetrics};
use crate::math::simpson;

/// Local tangent below this fraction of the initial modulus counts as softening.
const SOFTENING_RATIO: f64 = 0.85;

/// Relative (to peak) deviation from the elastic line that counts as cracking.
const CRACK_DEVIATION_RATIO: f64 = 0.01;

/// Points at or below this fraction of peak stress are never crack candidates.
const CRACK_MIN_STRESS_RATIO: f64 = 0.1;

/// Minimum post-peak points required before the ultimate scan runs.
const MIN_POST_PEAK_POINTS: usize = 5;

/// Look-ahead window: at least this many points...
const LOOK_AHEAD_MIN: usize = 10;
/// ...or this fraction of the curve length, whichever is larger.
const LOOK_AHEAD_FRACTION: f64 = 0.02;

/// Unit conversion applied to the integrated stress–strain area (MJ/m³ -> kJ/m³).
const ENERGY_SCALE: f64 = 1000.0;

/// Plateau means at or below this are treated as zero.
const PLATEAU_MEAN_EPS: f64 = 1e-6;

/// First-crack detection result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrackPoint {
    pub idx: usize,
    pub stress: f64,
}

/// Run the full tension pipeline on a prepared curve.
pub fn analyze_tension_curve(curve: &PreparedCurve, config: &AnalysisConfig) -> TensileMetrics {
    let peak = curve.peak();
    let fit = effective_modulus(curve, &peak, config);

    let tangent = tangent_modulus_curve(curve, peak.idx);
    let e_init = initial_modulus(&tangent).max(fit.slope);

    let crack = detect_crack(curve, &peak, &fit, &tangent, e_init, config);

    let threshold = config.ultimate_strain_ratio * peak.stress;
    let idx_u = detect_ultimate(&curve.smooth, peak.idx, threshold);

    let strain_energy = strain_energy(curve, idx_u);
    let fracture_energy = strain_energy * (config.gauge_length_mm / 1000.0);

    let ultimate_strain = curve.strain[idx_u];
    let hardening_capacity = (ultimate_strain - curve.strain[crack.idx]).max(0.0);
    let plateau_cv = plateau_cv(&curve.stress, crack.idx, idx_u);

    TensileMetrics {
        e_eff: fit.slope,
        e_init,
        e_intercept: fit.intercept,
        crack_stress: crack.stress,
        ultimate_stress: peak.stress,
        ultimate_strain,
        strain_energy,
        fracture_energy,
        hardening_capacity,
        plateau_cv,
        idx_peak: peak.idx,
        idx_cr: crack.idx,
        idx_u,
    }
}

/// First pre-peak index that leaves the elastic line.
///
/// A point qualifies when all three hold:
/// - actual stress sits below the regression line by more than
///   `max(crack_tolerance_base, 1% of peak)`
/// - the local tangent modulus has dropped below 85% of the initial modulus
/// - actual stress exceeds 10% of peak
///
/// Without a qualifying point the crack is placed at the peak.
pub fn detect_crack(
    curve: &PreparedCurve,
    peak: &Peak,
    fit: &ElasticFit,
    tangent: &[f64],
    e_init: f64,
    config: &AnalysisConfig,
) -> CrackPoint {
    let tolerance = config.crack_tolerance_base.max(CRACK_DEVIATION_RATIO * peak.stress);
    let softening = SOFTENING_RATIO * e_init;
    let min_stress = CRACK_MIN_STRESS_RATIO * peak.stress;

    let end = tangent.len().min(peak.idx);
    let found = (0..end).find(|&i| {
        let stress = curve.stress[i];
        let deviation = fit.stress_at(curve.strain[i]) - stress;
        deviation > tolerance && tangent[i] < softening && stress > min_stress
    });

    match found {
        Some(idx) => CrackPoint {
            idx,
            stress: curve.stress[idx],
        },
        None => CrackPoint {
            idx: peak.idx,
            stress: peak.stress,
        },
    }
}

/// Index at which the specimen is considered failed.
///
/// Scans forward from the peak over the smoothed stress. An index below
/// `threshold` is accepted only if the look-ahead window starting there also
/// stays below `threshold`, so a transient dip that recovers is skipped.
///
/// Terminal rules:
/// - fewer than `idx_peak + 5` points: the peak index
/// - no accepted index before the data ends: the last index
pub fn detect_ultimate(smooth: &[f64], idx_peak: usize, threshold: f64) -> usize {
    let n = smooth.len();
    if n < idx_peak + MIN_POST_PEAK_POINTS {
        return idx_peak;
    }

    let look_ahead = ((n as f64 * LOOK_AHEAD_FRACTION) as usize).max(LOOK_AHEAD_MIN);

    for i in idx_peak..n {
        if smooth[i] >= threshold {
            continue;
        }
        let end = (i + look_ahead).min(n);
        let window_max = smooth[i..end].iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if window_max < threshold {
            return i;
        }
    }

    n - 1
}

/// Area under the raw curve over `[0, idx_u]`, in kJ/m³.
///
/// Needs more than two points; any numeric failure gives 0.
pub fn strain_energy(curve: &PreparedCurve, idx_u: usize) -> f64 {
    let end = (idx_u + 1).min(curve.len());
    if end <= 2 {
        return 0.0;
    }
    match simpson(&curve.stress[..end], &curve.strain[..end]) {
        Some(area) => area * ENERGY_SCALE,
        None => {
            debug!(points = end, "energy integration failed; energy set to 0");
            0.0
        }
    }
}

/// Coefficient of variation of stress over `[idx_cr, idx_u)`.
///
/// Uses the population standard deviation. Zero when the hardening region has
/// fewer than two points or a non-positive mean.
pub fn plateau_cv(stress: &[f64], idx_cr: usize, idx_u: usize) -> f64 {
    if idx_u <= idx_cr + 1 {
        return 0.0;
    }
    let plateau = &stress[idx_cr..idx_u.min(stress.len())];
    if plateau.is_empty() {
        return 0.0;
    }
    let n = plateau.len() as f64;
    let mean = plateau.iter().sum::<f64>() / n;
    if mean <= PLATEAU_MEAN_EPS {
        return 0.0;
    }
    let var = plateau.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    var.sqrt() / mean
}
