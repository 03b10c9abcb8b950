//! Least squares solvers.
//!
//! Every regression in the analysis pipeline (elastic line, Savitzky–Golay edge
//! fits) reduces to a tiny polynomial least squares problem:
//!
//! ```text
//! minimize Σ (y_i - Σ_j c_j x_i^j)^2
//! ```
//!
//! Implementation choices:
//! - We solve with SVD so tall (more rows than columns) and near-singular
//!   design matrices are handled without panicking.
//! - Design columns are scaled to unit norm before solving. Strain values are
//!   tiny (1e-4 .. 1e-2) while the intercept column is all ones, and the raw
//!   matrix would otherwise be badly conditioned.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Fit a polynomial of the given degree.
///
/// Coefficients are returned in ascending order: `c[0] + c[1] x + c[2] x² + ...`.
/// Returns `None` when there are fewer points than coefficients, the inputs are
/// not finite, or the solve fails.
pub fn polyfit(x: &[f64], y: &[f64], degree: usize) -> Option<Vec<f64>> {
    let n = x.len();
    let p = degree + 1;
    if n != y.len() || n < p {
        return None;
    }
    if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return None;
    }

    let mut design = DMatrix::<f64>::zeros(n, p);
    for (i, &xi) in x.iter().enumerate() {
        let mut pow = 1.0;
        for j in 0..p {
            design[(i, j)] = pow;
            pow *= xi;
        }
    }

    let mut scale = vec![1.0; p];
    for j in 0..p {
        let norm = design.column(j).norm();
        if norm > 0.0 && norm.is_finite() {
            scale[j] = norm;
            design.column_mut(j).unscale_mut(norm);
        }
    }

    let rhs = DVector::from_column_slice(y);
    let beta = solve_least_squares(&design, &rhs)?;
    Some(beta.iter().zip(scale.iter()).map(|(b, s)| b / s).collect())
}

/// Evaluate ascending-order polynomial coefficients at `x`.
pub fn polyval(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

/// Ordinary least squares line `y = slope * x + intercept`.
///
/// Returns `(slope, intercept)`, or `None` when fewer than two points are
/// given or the fit is not finite.
pub fn linear_fit(x: &[f64], y: &[f64]) -> Option<(f64, f64)> {
    let coeffs = polyfit(x, y, 1)?;
    let (intercept, slope) = (coeffs[0], coeffs[1]);
    if slope.is_finite() && intercept.is_finite() {
        Some((slope, intercept))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn linear_fit_recovers_elastic_slope_at_small_strain() {
        let x: Vec<f64> = (0..20).map(|i| 1e-4 * i as f64).collect();
        let y: Vec<f64> = x.iter().map(|&e| 20_000.0 * e + 0.3).collect();

        let (slope, intercept) = linear_fit(&x, &y).unwrap();
        assert!((slope - 20_000.0).abs() < 1e-6);
        assert!((intercept - 0.3).abs() < 1e-9);
    }

    #[test]
    fn polyfit_cubic_is_exact_on_cubic_data() {
        let x: Vec<f64> = (0..9).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|&t| 1.0 - 2.0 * t + 0.5 * t * t + 0.25 * t * t * t).collect();

        let c = polyfit(&x, &y, 3).unwrap();
        for (got, want) in c.iter().zip([1.0, -2.0, 0.5, 0.25]) {
            assert!((got - want).abs() < 1e-8, "{got} vs {want}");
        }
        assert!((polyval(&c, 10.0) - (1.0 - 20.0 + 50.0 + 250.0)).abs() < 1e-6);
    }

    #[test]
    fn polyfit_rejects_underdetermined_input() {
        assert!(polyfit(&[1.0, 2.0], &[1.0, 2.0], 2).is_none());
        assert!(linear_fit(&[1.0, f64::NAN, 3.0], &[1.0, 2.0, 3.0]).is_none());
    }
}
