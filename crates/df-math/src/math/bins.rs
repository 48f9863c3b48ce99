//! Evenly spaced class bins and nearest-bin assignment.
//!
//! Bins follow the usual `linspace` convention: the first point is exactly
//! `start`, the last point is exactly `stop`, and interior points are
//! `start + i * step`.

/// `n` evenly spaced points over `[start, stop]`.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut points: Vec<f64> = (0..n).map(|i| start + i as f64 * step).collect();
            points[n - 1] = stop;
            points
        }
    }
}

/// Index of the bin closest to `v` by absolute distance.
///
/// Ties resolve to the lower index. Returns `None` for empty bins or NaN input.
pub fn nearest_bin(v: f64, bins: &[f64]) -> Option<usize> {
    if v.is_nan() {
        return None;
    }
    let mut best: Option<(usize, f64)> = None;
    for (i, b) in bins.iter().enumerate() {
        let d = (v - b).abs();
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((i, d)),
        }
    }
    best.map(|(i, _)| i)
}
