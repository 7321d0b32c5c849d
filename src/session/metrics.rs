//! Derived metrics computed from raw session counters.

/// Divides two counters, yielding the numerator itself when the denominator is zero.
pub fn ratio(numerator: u32, denominator: u32) -> f64 {
    if denominator == 0 {
        f64::from(numerator)
    } else {
        f64::from(numerator) / f64::from(denominator)
    }
}

/// Arithmetic mean, 0 for an empty slice.
pub fn average(values: &[u32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sum: u64 = values.iter().map(|&v| u64::from(v)).sum();
    sum as f64 / values.len() as f64
}

/// GLV rating: `floor(log2(kdr) * kills / 200 * 2000)`, or 0 when `kdr <= 0`.
pub fn rating(kdr: f64, kills: u32) -> i64 {
    if kdr <= 0.0 || !kdr.is_finite() {
        return 0;
    }
    (kdr.log2() * f64::from(kills) / 200.0 * 2000.0).floor() as i64
}
