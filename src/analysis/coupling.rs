//! Coupling between modes over a gapped, patched sampling pattern.
//!
//! # Mathematical Background
//!
//! For samples at times `t_j` (relative to the analysis epoch) the
//! direct average of a complex exponential is
//!
//! ```text
//! coeff(ω) = (1/N) Σⱼ exp(−iω tⱼ)
//! ```
//!
//! Within one patch of `n` samples spaced `Δ` apart and starting at
//! offset `o`, the geometric sum has the closed form
//!
//! ```text
//! Σⱼ exp(−iω(o + jΔ)) = n · exp(−iβx) · factor(x, n)
//! x = ωΔ,   β = o/Δ + (n − 1)/2
//! factor(x, n) = sin(nx/2) / (n sin(x/2))
//! ```
//!
//! so `coeff` costs one term per patch rather than one per sample. The
//! coupling between modes q and p is `coeff(ω_q − ω_p)`; the mirror
//! coupling of q with its own negative-frequency image is `coeff(2ω_q)`.

use num_complex::Complex64;

use crate::series::PatchSet;
use crate::types::{Speed, Timestamp};

/// Below this |sin(x/2)| the ratio takes its limit value.
const FACTOR_EPSILON: f64 = 1e-12;

/// `sin(nx/2) / (n sin(x/2))`, the normalized Dirichlet kernel.
///
/// At multiples `x = 2πk` the limit is `(−1)^(k(n−1))`.
pub fn factor(x: f64, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let half = 0.5 * x;
    let denominator = half.sin();
    if denominator.abs() < FACTOR_EPSILON {
        let k = (x / (2.0 * std::f64::consts::PI)).round() as i64;
        return if (k * (n as i64 - 1)) % 2 == 0 { 1.0 } else { -1.0 };
    }
    (n as f64 * half).sin() / (n as f64 * denominator)
}

/// Sampling geometry of one patch, in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
struct PatchGeometry {
    offset: f64,
    step: f64,
    size: usize,
}

/// Closed-form direct averages over a patch set.
#[derive(Clone, Debug)]
pub struct Coupling {
    patches: Vec<PatchGeometry>,
    total: usize,
}

impl Coupling {
    /// Capture the sampling geometry of `patches` relative to `epoch`.
    pub fn new(patches: &PatchSet, epoch: Timestamp) -> Self {
        let geometry = patches
            .patches()
            .iter()
            .map(|p| PatchGeometry {
                offset: p.offset_from(epoch).as_secs_f64(),
                step: p.step().as_secs_f64(),
                size: p.size(),
            })
            .collect();
        Self {
            patches: geometry,
            total: patches.total_samples(),
        }
    }

    /// Total number of logical samples.
    pub fn samples(&self) -> usize {
        self.total
    }

    /// `(1/N) Σ exp(−iωt)` over all samples.
    pub fn coeff(&self, omega: f64) -> Complex64 {
        if self.total == 0 {
            return Complex64::new(0.0, 0.0);
        }
        let n_total = self.total as f64;
        self.patches
            .iter()
            .map(|p| {
                let x = omega * p.step;
                let beta = p.offset / p.step + 0.5 * (p.size as f64 - 1.0);
                let weight = p.size as f64 / n_total * factor(x, p.size);
                Complex64::from_polar(weight, -beta * x)
            })
            .sum()
    }

    /// Coupling of mode `q` with mode `p`.
    pub fn coupling(&self, q: Speed, p: Speed) -> Complex64 {
        self.coeff(q.radians_per_second() - p.radians_per_second())
    }

    /// Coupling of mode `q` with its mirror image at −ω_q.
    pub fn mirror(&self, q: Speed) -> Complex64 {
        self.coeff(2.0 * q.radians_per_second())
    }
}
