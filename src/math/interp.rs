//! Piecewise-linear interpolation on a sorted wavenumber grid.
//!
//! Emulator outputs live on a fixed grid of `modes`; callers ask for arbitrary
//! `k` inside that grid. We never extrapolate: queries outside `[x_min, x_max]`
//! are rejected by the caller before we get here, and `interp_linear` returns
//! `None` as a last line of defense.

/// Return `(min, max)` of a non-empty slice of finite values.
pub fn bounds(values: &[f64]) -> Option<(f64, f64)> {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for &v in values {
        if !v.is_finite() {
            return None;
        }
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if values.is_empty() { None } else { Some((lo, hi)) }
}

/// `true` when `xs` is finite and strictly increasing (at least two points).
pub fn is_strictly_increasing(xs: &[f64]) -> bool {
    xs.len() >= 2 && xs.iter().all(|x| x.is_finite()) && xs.windows(2).all(|w| w[0] < w[1])
}

/// Evaluate the linear interpolant through `(xs, ys)` at `x`.
///
/// `xs` must be strictly increasing. Returns `None` when `x` lies outside
/// `[xs[0], xs[n-1]]`. At a grid node the stored value is returned exactly.
pub fn interp_linear(xs: &[f64], ys: &[f64], x: f64) -> Option<f64> {
    debug_assert_eq!(xs.len(), ys.len());
    let n = xs.len();
    if n == 0 || !(x >= xs[0] && x <= xs[n - 1]) {
        return None;
    }

    let idx = xs.partition_point(|&g| g < x);
    if xs[idx] == x {
        return Some(ys[idx]);
    }
    Some(linear_interp((xs[idx - 1], ys[idx - 1]), (xs[idx], ys[idx]), x))
}

/// Interpolate a whole row onto `targets`.
///
/// Returns `None` if any target is out of range.
pub fn interp_row(xs: &[f64], ys: &[f64], targets: &[f64]) -> Option<Vec<f64>> {
    targets.iter().map(|&x| interp_linear(xs, ys, x)).collect()
}

fn linear_interp(a: (f64, f64), b: (f64, f64), x: f64) -> f64 {
    let (x0, y0) = a;
    let (x1, y1) = b;
    let u = (x - x0) / (x1 - x0);
    y0 + u * (y1 - y0)
}
