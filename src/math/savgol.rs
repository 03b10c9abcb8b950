//! Savitzky–Golay smoothing.
//!
//! Each interior point is replaced by the value at the window centre of a
//! least squares polynomial fitted to the surrounding `window` samples. Because
//! the samples are uniformly indexed, this is a fixed convolution whose
//! coefficients are the first row of the pseudo-inverse of the Vandermonde
//! matrix over offsets `-m..=m`.
//!
//! Edges use the "interp" strategy: a single polynomial is fitted to the first
//! (last) `window` samples and evaluated at the first (last) `m` positions.

use nalgebra::DMatrix;

use crate::math::ols::{polyfit, polyval};

/// Smooth `y` with a Savitzky–Golay filter.
///
/// Returns `None` when the filter cannot be applied:
/// - `window` is even or larger than the series
/// - `polyorder >= window`
/// - the coefficient solve fails or produces non-finite output
pub fn savgol_filter(y: &[f64], window: usize, polyorder: usize) -> Option<Vec<f64>> {
    let n = y.len();
    if window % 2 == 0 || window > n || polyorder >= window {
        return None;
    }
    if y.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let half = window / 2;
    let coeffs = smoothing_coefficients(window, polyorder)?;

    let mut out = vec![0.0; n];
    for i in half..n - half {
        let seg = &y[i - half..=i + half];
        out[i] = coeffs.iter().zip(seg).map(|(c, v)| c * v).sum();
    }

    let positions: Vec<f64> = (0..window).map(|k| k as f64).collect();

    let head = polyfit(&positions, &y[..window], polyorder)?;
    for (i, slot) in out.iter_mut().enumerate().take(half) {
        *slot = polyval(&head, i as f64);
    }

    let tail = polyfit(&positions, &y[n - window..], polyorder)?;
    for k in window - half..window {
        out[n - window + k] = polyval(&tail, k as f64);
    }

    if out.iter().all(|v| v.is_finite()) {
        Some(out)
    } else {
        None
    }
}

fn smoothing_coefficients(window: usize, polyorder: usize) -> Option<Vec<f64>> {
    let half = (window / 2) as f64;
    let p = polyorder + 1;

    let mut vander = DMatrix::<f64>::zeros(window, p);
    for k in 0..window {
        let z = k as f64 - half;
        let mut pow = 1.0;
        for j in 0..p {
            vander[(k, j)] = pow;
            pow *= z;
        }
    }

    let pinv = vander.pseudo_inverse(1e-12).ok()?;
    Some(pinv.row(0).iter().copied().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_five_point_quadratic_coefficients() {
        // Savitzky & Golay (1964): [-3, 12, 17, 12, -3] / 35
        let c = smoothing_coefficients(5, 2).unwrap();
        let expected = [-3.0, 12.0, 17.0, 12.0, -3.0].map(|v| v / 35.0);
        for (got, want) in c.iter().zip(expected) {
            assert!((got - want).abs() < 1e-12, "{got} vs {want}");
        }
    }

    #[test]
    fn cubic_signal_passes_through_unchanged() {
        let y: Vec<f64> = (0..30)
            .map(|i| {
                let t = i as f64 * 0.1;
                2.0 + t - 0.5 * t * t + 0.1 * t * t * t
            })
            .collect();
        let s = savgol_filter(&y, 11, 3).unwrap();
        assert_eq!(s.len(), y.len());
        for (a, b) in s.iter().zip(&y) {
            assert!((a - b).abs() < 1e-8);
        }
    }

    #[test]
    fn filter_reduces_alternating_noise() {
        let y: Vec<f64> = (0..50)
            .map(|i| i as f64 + if i % 2 == 0 { 0.5 } else { -0.5 })
            .collect();
        let s = savgol_filter(&y, 11, 3).unwrap();
        let rough: f64 = y.windows(2).map(|w| (w[1] - w[0] - 1.0).abs()).sum();
        let smooth: f64 = s[5..45].windows(2).map(|w| (w[1] - w[0] - 1.0).abs()).sum();
        assert!(smooth < rough * 0.2);
    }

    #[test]
    fn infeasible_windows_are_rejected() {
        let y = vec![1.0; 8];
        assert!(savgol_filter(&y, 10, 3).is_none());
        assert!(savgol_filter(&y, 9, 3).is_none());
        assert!(savgol_filter(&y, 3, 3).is_none());
        assert!(savgol_filter(&y, 5, 2).is_some());
    }
}
