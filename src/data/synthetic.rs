//! Synthetic ECC tension curves.
//!
//! Produces deterministic, seeded stress–strain records with the three regimes
//! of a strain-hardening composite:
//!
//! - a linear-elastic ramp up to first cracking
//! - a concave hardening branch with optional multiple-cracking stress drops
//! - a linear softening tail after the ultimate point
//!
//! Gaussian noise is added to stress. The records are used by `ecc demo` and by
//! tests that need realistic curves without fixture files.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::RawSample;
use crate::error::AppError;

/// Shape parameters for a synthetic tension curve (MPa, absolute strain).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TensileCurveSpec {
    pub modulus: f64,
    pub crack_stress: f64,
    pub ultimate_stress: f64,
    pub ultimate_strain: f64,
    /// Strain at which the softening tail ends.
    pub end_strain: f64,
    /// Stress at the end of the tail, as a fraction of `ultimate_stress`.
    pub end_ratio: f64,
    pub elastic_points: usize,
    pub hardening_points: usize,
    pub softening_points: usize,
    /// Standard deviation of additive stress noise.
    pub noise_sd: f64,
    /// Number of evenly spaced multiple-cracking drops on the hardening branch.
    pub crack_drops: usize,
    pub drop_depth: f64,
    /// Emit strain in percent instead of absolute units.
    pub percent_strain: bool,
}

impl Default for TensileCurveSpec {
    fn default() -> Self {
        Self {
            modulus: 20_000.0,
            crack_stress: 3.0,
            ultimate_stress: 5.0,
            ultimate_strain: 0.03,
            end_strain: 0.035,
            end_ratio: 0.4,
            elastic_points: 60,
            hardening_points: 500,
            softening_points: 100,
            noise_sd: 0.005,
            crack_drops: 0,
            drop_depth: 0.2,
            percent_strain: false,
        }
    }
}

impl TensileCurveSpec {
    pub fn crack_strain(&self) -> f64 {
        self.crack_stress / self.modulus
    }

    fn validate(&self) -> Result<(), AppError> {
        let e_cr = self.crack_strain();
        if !(self.modulus > 0.0 && self.crack_stress > 0.0 && self.ultimate_stress >= self.crack_stress) {
            return Err(AppError::new(2, "Synthetic curve needs 0 < crack stress <= ultimate stress."));
        }
        if !(e_cr < self.ultimate_strain && self.ultimate_strain < self.end_strain) {
            return Err(AppError::new(
                2,
                "Synthetic curve needs crack strain < ultimate strain < end strain.",
            ));
        }
        if self.elastic_points < 2 || self.hardening_points < 2 || self.softening_points < 1 {
            return Err(AppError::new(2, "Synthetic curve needs points in every regime."));
        }
        Ok(())
    }

    /// Noise-free stress at absolute strain `e` (without cracking drops).
    pub fn envelope(&self, e: f64) -> f64 {
        let e_cr = self.crack_strain();
        if e <= e_cr {
            self.modulus * e
        } else if e <= self.ultimate_strain {
            let u = (e - e_cr) / (self.ultimate_strain - e_cr);
            self.crack_stress + (self.ultimate_stress - self.crack_stress) * (1.0 - (1.0 - u).powi(2))
        } else {
            let u = (e - self.ultimate_strain) / (self.end_strain - self.ultimate_strain);
            self.ultimate_stress * (1.0 - (1.0 - self.end_ratio) * u)
        }
    }
}

/// Generate one synthetic tension record.
pub fn generate_tensile_curve(
    name: &str,
    group: &str,
    spec: &TensileCurveSpec,
    seed: u64,
) -> Result<RawSample, AppError> {
    spec.validate()?;

    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, spec.noise_sd.max(0.0))
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let e_cr = spec.crack_strain();
    let mut strain = Vec::with_capacity(spec.elastic_points + spec.hardening_points + spec.softening_points);
    strain.extend(linspace(0.0, e_cr, spec.elastic_points));
    strain.extend(linspace(e_cr, spec.ultimate_strain, spec.hardening_points + 1).skip(1));
    strain.extend(linspace(spec.ultimate_strain, spec.end_strain, spec.softening_points + 1).skip(1));

    let mut stress: Vec<f64> = strain.iter().map(|&e| spec.envelope(e)).collect();

    if spec.crack_drops > 0 {
        let start = spec.elastic_points;
        let span = spec.hardening_points;
        let step = span / (spec.crack_drops + 1);
        for k in 1..=spec.crack_drops {
            let at = start + k * step;
            for (offset, factor) in [1.0, 0.5, 0.25].into_iter().enumerate() {
                if let Some(s) = stress.get_mut(at + offset) {
                    *s -= spec.drop_depth * factor;
                }
            }
        }
    }

    for s in &mut stress {
        *s += normal.sample(&mut rng);
    }

    if spec.percent_strain {
        for e in &mut strain {
            *e *= 100.0;
        }
    }

    Ok(RawSample::new(name, group, strain, stress))
}

/// Generate `count` specimens of one batch with seed-dependent scatter in
/// crack stress, ultimate stress and ultimate strain.
pub fn generate_batch(group: &str, count: usize, base: &TensileCurveSpec, seed: u64) -> Result<Vec<RawSample>, AppError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let scatter = Normal::new(1.0, 0.05).map_err(|e| AppError::new(4, format!("Scatter distribution error: {e}")))?;

    (0..count)
        .map(|i| {
            let mut spec = *base;
            spec.crack_stress *= scatter.sample(&mut rng);
            spec.ultimate_stress = (base.ultimate_stress * scatter.sample(&mut rng)).max(spec.crack_stress);
            spec.ultimate_strain *= scatter.sample(&mut rng);
            spec.end_strain = spec.ultimate_strain + (base.end_strain - base.ultimate_strain);
            let name = format!("{group}-{:02}", i + 1);
            generate_tensile_curve(&name, group, &spec, seed.wrapping_add(i as u64 + 1))
        })
        .collect()
}

/// `n` evenly spaced values from `start` to `end` inclusive.
fn linspace(start: f64, end: f64, n: usize) -> impl Iterator<Item = f64> {
    let denom = n.saturating_sub(1).max(1) as f64;
    (0..n).map(move |i| start + (end - start) * i as f64 / denom)
}
