//! Smooth blending weights for year-boundary transitions.
//!
//! The weight is the quintic smoothstep on `[-1, 1]`:
//!
//! ```text
//! w(x) = 1/2 + (15x - 10x³ + 3x⁵) / 16
//! ```
//!
//! It rises from 0 at `x = -1` to 1 at `x = 1` with vanishing first and
//! second derivatives at both ends, so a blend between two evaluations is
//! C² continuous.

/// Half-width of the blending window around a year boundary, in seconds.
pub const BLEND_INTERVAL: f64 = 3600.0;

/// The `n`-th derivative of the blend weight at `x` (with respect to `x`).
///
/// Outside `(-1, 1)` the weight is constant: 1 to the right, 0 to the
/// left, and every derivative is 0.
pub fn blend_weight(x: f64, n: u32) -> f64 {
    let x2 = x * x;
    if x2 >= 1.0 {
        return if n == 0 && x > 0.0 { 1.0 } else { 0.0 };
    }
    match n {
        0 => ((3.0 * x2 - 10.0) * x2 + 15.0) * x / 16.0 + 0.5,
        1 => ((x2 - 2.0) * x2 + 1.0) * (15.0 / 16.0),
        2 => (x2 - 1.0) * x * (15.0 / 4.0),
        3 => (3.0 * x2 - 1.0) * (15.0 / 4.0),
        4 => x * (45.0 / 2.0),
        5 => 45.0 / 2.0,
        _ => 0.0,
    }
}

/// Combine the `order`-th derivative of `f1 + w·(f2 - f1)` by Leibniz' rule.
///
/// `f1[j]` and `f2[j]` hold the j-th derivatives of the two signals for
/// `j = 0..=order`; `x` is the blend coordinate and `scale` the seconds per
/// unit of `x`.
pub fn blend_derivative(f1: &[f64], f2: &[f64], x: f64, scale: f64, order: usize) -> f64 {
    let mut value = f1[order];
    let mut binomial = 1.0;
    let mut dx = 1.0;
    for n in 0..=order {
        let w = blend_weight(x, n as u32) / dx;
        value += binomial * w * (f2[order - n] - f1[order - n]);
        binomial *= (order - n) as f64 / (n + 1) as f64;
        dx *= scale;
    }
    value
}
