//! Order statistics over latency samples.

/// Arithmetic mean, 0 for an empty slice.
pub fn average(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

/// `p`-th percentile of an ascending slice by linear interpolation between
/// the two nearest ranks, using rank `k = (n - 1) * p / 100`.
///
/// Returns 0 for an empty slice. `p` is clamped to `0..=100`.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }

    let p = p.clamp(0.0, 100.0);
    let k = (sorted.len() - 1) as f64 * p / 100.0;
    let floor = k.floor();
    let ceil = k.ceil();

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let (lo, hi) = (floor as usize, ceil as usize);

    if lo == hi {
        return sorted[lo];
    }
    sorted[lo] * (ceil - k) + sorted[hi] * (k - floor)
}
