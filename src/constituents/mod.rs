//! Harmonic constituent sets and their evaluation.
//!
//! A constituent set models a station's level as a datum plus a sum of
//! cosines:
//!
//! ```text
//! r(t) = datum + Σᵢ Aᵢ cos(ωᵢ (t - t₀) + φᵢ)
//! ```
//!
//! Its k-th time derivative is
//!
//! ```text
//! r⁽ᵏ⁾(t) = Σᵢ ωᵢᵏ Aᵢ cos(ωᵢ (t - t₀) + φᵢ + kπ/2)      (k ≥ 1)
//! ```
//!
//! which the event predictor uses for root finding. Two implementations
//! are provided: [`RunningSet`] with constant coefficients, and
//! [`AstronomicalSet`] whose amplitudes and phases carry yearly node
//! factor and equilibrium argument corrections.

mod astronomical;
mod blend;
mod running;

pub use astronomical::{AstronomicalConstituent, AstronomicalSet};
pub use blend::{BLEND_INTERVAL, blend_derivative, blend_weight};
pub use running::RunningSet;

use std::f64::consts::FRAC_PI_2;

use crate::error::Result;
use crate::types::{Amplitude, Speed, Timestamp};

/// Safety margin applied to derivative bounds.
pub const DERIVATIVE_MAX_MARGIN: f64 = 1.1;

/// A set of harmonic constituents that can be evaluated at any instant.
pub trait ConstituentSet {
    /// Zero-frequency mean level.
    fn datum(&self) -> Amplitude;

    /// The `order`-th time derivative of the harmonic sum, excluding the datum.
    fn tide_derivative(&self, t: Timestamp, order: u32) -> Result<Amplitude>;

    /// Upper bound on |`tide_derivative(t, order)`| over all t.
    fn tide_derivative_max(&self, order: u32) -> Result<Amplitude>;

    /// True when there are no non-datum constituents.
    fn is_empty(&self) -> bool;

    /// True when the set models a current rather than a height.
    fn is_current(&self) -> bool {
        self.datum().is_current()
    }

    /// True when `mark` can be compared with levels of this set.
    fn mark_compatible(&self, mark: Amplitude) -> bool {
        mark.dimension() == self.datum().dimension()
    }
}

/// One evaluated cosine term.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Term {
    pub speed: Speed,
    pub amplitude: f64,
    pub phase: f64,
}

/// Σ ωᵏ A cos(ω·dt + φ + kπ/2) over `terms`.
pub(crate) fn harmonic_sum(terms: &[Term], dt: f64, order: u32) -> f64 {
    let shift = order as f64 * FRAC_PI_2;
    terms
        .iter()
        .map(|term| {
            let w = term.speed.radians_per_second();
            w.powi(order as i32) * term.amplitude * (w * dt + term.phase + shift).cos()
        })
        .sum()
}

/// Σ ωᵏ A over `terms`, without margin.
pub(crate) fn derivative_bound(terms: &[Term], order: u32) -> f64 {
    terms
        .iter()
        .map(|term| term.speed.radians_per_second().powi(order as i32) * term.amplitude.abs())
        .sum()
}
