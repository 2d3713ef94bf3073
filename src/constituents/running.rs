//! Constituent set with constant coefficients.

use num_complex::Complex64;

use super::{ConstituentSet, DERIVATIVE_MAX_MARGIN, Term, derivative_bound, harmonic_sum};
use crate::error::{Result, TideError};
use crate::types::{Amplitude, Speed, Timestamp};

/// Constituents with fixed amplitudes and phases relative to an epoch.
///
/// This is the direct output of harmonic analysis: no yearly
/// corrections are applied.
///
/// # Example
///
/// ```
/// use tide_harmonics::constituents::{ConstituentSet, RunningSet};
/// use tide_harmonics::types::{Amplitude, Speed, Timestamp};
///
/// let epoch = Timestamp::from_seconds(0);
/// let mut set = RunningSet::new(Amplitude::meters(1.0), epoch);
/// set.append(
///     Amplitude::meters(1.5),
///     Speed::from_degrees_per_hour(29.9).unwrap(),
///     10f64.to_radians(),
/// )
/// .unwrap();
///
/// let level = set.datum().value() + set.tide_derivative(epoch, 0).unwrap().value();
/// assert!((level - 2.477).abs() < 1e-3);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct RunningSet {
    datum: Amplitude,
    epoch: Timestamp,
    terms: Vec<Term>,
}

impl RunningSet {
    /// Create an empty set with a datum and phase reference.
    pub fn new(datum: Amplitude, epoch: Timestamp) -> Self {
        Self {
            datum,
            epoch,
            terms: Vec::new(),
        }
    }

    /// Add a constituent; `phase` in radians.
    pub fn append(&mut self, amplitude: Amplitude, speed: Speed, phase: f64) -> Result<()> {
        if amplitude.dimension() != self.datum.dimension() {
            return Err(TideError::dimension_mismatch(
                self.datum.dimension(),
                amplitude.dimension(),
            ));
        }
        self.terms.push(Term {
            speed,
            amplitude: amplitude.value(),
            phase,
        });
        Ok(())
    }

    /// Add a constituent from a complex amplitude in datum units.
    pub fn append_complex(&mut self, coefficient: Complex64, speed: Speed) {
        self.terms.push(Term {
            speed,
            amplitude: coefficient.norm(),
            phase: coefficient.arg(),
        });
    }

    /// Phase reference.
    pub fn epoch(&self) -> Timestamp {
        self.epoch
    }

    /// Number of non-datum constituents.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// `(speed, complex amplitude)` of each non-datum constituent.
    pub fn coefficients(&self) -> impl Iterator<Item = (Speed, Complex64)> + '_ {
        self.terms
            .iter()
            .map(|t| (t.speed, Complex64::from_polar(t.amplitude, t.phase)))
    }

    /// Amplitude and phase (radians) of the constituent at `speed`.
    pub fn get(&self, speed: Speed) -> Option<(Amplitude, f64)> {
        self.terms
            .iter()
            .find(|t| t.speed == speed)
            .map(|t| (Amplitude::new(t.amplitude, self.datum.dimension()), t.phase))
    }
}

impl ConstituentSet for RunningSet {
    fn datum(&self) -> Amplitude {
        self.datum
    }

    fn tide_derivative(&self, t: Timestamp, order: u32) -> Result<Amplitude> {
        let dt = (t - self.epoch).as_secs_f64();
        Ok(Amplitude::new(
            harmonic_sum(&self.terms, dt, order),
            self.datum.dimension().derivative(order),
        ))
    }

    fn tide_derivative_max(&self, order: u32) -> Result<Amplitude> {
        Ok(Amplitude::new(
            derivative_bound(&self.terms, order) * DERIVATIVE_MAX_MARGIN,
            self.datum.dimension().derivative(order),
        ))
    }

    fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}
