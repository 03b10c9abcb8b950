//! Numeric differentiation and integration on non-uniform grids.

/// Derivative `dy/dx` sampled at every `x`.
///
/// Interior points use second-order central differences that account for
/// unequal spacing; the two end points use first-order one-sided differences.
/// Zero-width steps produce non-finite values, which callers are expected to
/// sanitize. Returns `None` for fewer than two points or mismatched lengths.
pub fn gradient(y: &[f64], x: &[f64]) -> Option<Vec<f64>> {
    let n = y.len();
    if n < 2 || x.len() != n {
        return None;
    }

    let mut out = vec![0.0; n];
    out[0] = (y[1] - y[0]) / (x[1] - x[0]);
    out[n - 1] = (y[n - 1] - y[n - 2]) / (x[n - 1] - x[n - 2]);

    for i in 1..n - 1 {
        let h1 = x[i] - x[i - 1];
        let h2 = x[i + 1] - x[i];
        let a = -h2 / (h1 * (h1 + h2));
        let b = (h2 - h1) / (h1 * h2);
        let c = h1 / (h2 * (h1 + h2));
        out[i] = a * y[i - 1] + b * y[i] + c * y[i + 1];
    }

    Some(out)
}

/// Composite Simpson integral of `y` over `x` (non-uniform spacing).
///
/// With an odd number of points every pair of intervals is integrated by a
/// parabola. With an even number, the last interval is closed with Cartwright's
/// three-point parabolic correction. Returns `None` for fewer than three points,
/// mismatched lengths, or a non-finite result.
pub fn simpson(y: &[f64], x: &[f64]) -> Option<f64> {
    let n = y.len();
    if n < 3 || x.len() != n {
        return None;
    }

    let paired_end = if n % 2 == 1 { n - 1 } else { n - 2 };
    let mut total = 0.0;
    let mut i = 0;
    while i + 2 <= paired_end {
        let h0 = x[i + 1] - x[i];
        let h1 = x[i + 2] - x[i + 1];
        let hsum = h0 + h1;
        let ratio = h0 / h1;
        total += hsum / 6.0
            * (y[i] * (2.0 - 1.0 / ratio) + y[i + 1] * (hsum * hsum / (h0 * h1)) + y[i + 2] * (2.0 - ratio));
        i += 2;
    }

    if n % 2 == 0 {
        let h0 = x[n - 2] - x[n - 3];
        let h1 = x[n - 1] - x[n - 2];
        let alpha = (2.0 * h1 * h1 + 3.0 * h0 * h1) / (6.0 * (h0 + h1));
        let beta = (h1 * h1 + 3.0 * h0 * h1) / (6.0 * h0);
        let eta = h1 * h1 * h1 / (6.0 * h0 * (h0 + h1));
        total += alpha * y[n - 1] + beta * y[n - 2] - eta * y[n - 3];
    }

    total.is_finite().then_some(total)
}
