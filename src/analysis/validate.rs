//! Raw curve cleaning and validation.
//!
//! Turns a pair of loader-provided sequences into a curve that is safe to
//! differentiate: finite, sorted by strain, one point per strain value, with a
//! non-degenerate span on both axes.

use crate::error::{CurveError, InsufficientStage, RangeAxis};

/// Minimum number of points for a reliable mechanics analysis.
pub const MIN_POINTS: usize = 5;

/// Spans below this are treated as a flat or disconnected sensor.
pub const MIN_SPAN: f64 = 1e-9;

/// A cleaned curve: strain strictly increasing and unique, all values finite.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedCurve {
    strain: Vec<f64>,
    stress: Vec<f64>,
}

impl ValidatedCurve {
    pub fn strain(&self) -> &[f64] {
        &self.strain
    }

    pub fn stress(&self) -> &[f64] {
        &self.stress
    }

    pub fn len(&self) -> usize {
        self.strain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strain.is_empty()
    }

    pub fn into_parts(self) -> (Vec<f64>, Vec<f64>) {
        (self.strain, self.stress)
    }
}

/// Check that both sequences have the same length.
pub fn check_dimensions(strain: &[f64], stress: &[f64]) -> Result<(), CurveError> {
    if strain.len() != stress.len() {
        return Err(CurveError::DimensionMismatch {
            strain: strain.len(),
            stress: stress.len(),
        });
    }
    Ok(())
}

/// Clean, sort, deduplicate, and range-check a raw curve.
///
/// Duplicate strain values keep the stress of their first occurrence in the
/// input order.
pub fn validate_and_sort(strain: &[f64], stress: &[f64]) -> Result<ValidatedCurve, CurveError> {
    check_dimensions(strain, stress)?;
    require_points(strain.len(), InsufficientStage::Raw)?;

    let mut pairs: Vec<(usize, f64, f64)> = strain
        .iter()
        .zip(stress)
        .enumerate()
        .filter(|(_, (e, s))| e.is_finite() && s.is_finite())
        // `+ 0.0` folds -0.0 into 0.0 so both sort as one strain value.
        .map(|(i, (&e, &s))| (i, e + 0.0, s))
        .collect();
    require_points(pairs.len(), InsufficientStage::Finite)?;

    // Stable ordering by (strain, original index) so the first occurrence of a
    // duplicate is the one kept.
    pairs.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
    pairs.dedup_by(|later, first| later.1 == first.1);
    require_points(pairs.len(), InsufficientStage::Unique)?;

    let strain: Vec<f64> = pairs.iter().map(|p| p.1).collect();
    let stress: Vec<f64> = pairs.iter().map(|p| p.2).collect();

    let strain_span = strain[strain.len() - 1] - strain[0];
    if strain_span < MIN_SPAN {
        return Err(CurveError::DegenerateRange {
            axis: RangeAxis::Strain,
            span: strain_span,
        });
    }

    let (lo, hi) = stress
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let stress_span = hi - lo;
    if stress_span < MIN_SPAN {
        return Err(CurveError::DegenerateRange {
            axis: RangeAxis::Stress,
            span: stress_span,
        });
    }

    Ok(ValidatedCurve { strain, stress })
}

fn require_points(count: usize, stage: InsufficientStage) -> Result<(), CurveError> {
    if count < MIN_POINTS {
        return Err(CurveError::InsufficientData {
            stage,
            count,
            required: MIN_POINTS,
        });
    }
    Ok(())
}
