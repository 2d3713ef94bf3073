//! Constituent set with yearly node factor and equilibrium corrections.
//!
//! Each calendar year uses its own amplitudes (`A · fᵧ`) and phases
//! (`φ + Vᵧ`) referenced to the start of that UTC year. Within an hour of
//! a year boundary the two neighbouring years are blended with a quintic
//! smoothstep so the level and its first derivatives stay continuous.

use tracing::debug;

use super::blend::{BLEND_INTERVAL, blend_derivative};
use super::{ConstituentSet, DERIVATIVE_MAX_MARGIN, Term, derivative_bound, harmonic_sum};
use crate::error::{Result, TideError};
use crate::types::{Amplitude, Speed, Timestamp};

/// A constituent with per-year corrections.
#[derive(Clone, Debug, PartialEq)]
pub struct AstronomicalConstituent {
    /// Constituent name (e.g., "M2")
    pub name: String,
    /// Angular speed
    pub speed: Speed,
    /// Mean amplitude in datum units
    pub amplitude: f64,
    /// Phase in radians
    pub phase: f64,
    /// Node factor for each year of the table
    pub node_factors: Vec<f64>,
    /// Equilibrium argument in radians for each year of the table
    pub equilibrium_arguments: Vec<f64>,
}

/// Corrected terms for one calendar year.
#[derive(Clone, Debug)]
struct YearTerms {
    start: Timestamp,
    end: Timestamp,
    terms: Vec<Term>,
}

impl YearTerms {
    fn evaluate(&self, t: Timestamp, order: u32) -> f64 {
        harmonic_sum(&self.terms, (t - self.start).as_secs_f64(), order)
    }

    fn derivatives(&self, t: Timestamp, order: u32) -> Vec<f64> {
        (0..=order).map(|k| self.evaluate(t, k)).collect()
    }
}

/// Constituents corrected year by year, blended across year boundaries.
#[derive(Clone, Debug)]
pub struct AstronomicalSet {
    datum: Amplitude,
    first_year: i32,
    years: Vec<YearTerms>,
    constituents: usize,
}

impl AstronomicalSet {
    /// Build the per-year tables starting at `first_year`.
    ///
    /// Every constituent must have one node factor and one equilibrium
    /// argument per year, and all constituents must cover the same years.
    pub fn new(
        datum: Amplitude,
        first_year: i32,
        constituents: Vec<AstronomicalConstituent>,
    ) -> Result<Self> {
        let n_years = constituents.first().map_or(0, |c| c.node_factors.len());
        for c in &constituents {
            if c.node_factors.len() != n_years || c.equilibrium_arguments.len() != n_years {
                return Err(TideError::unsupported_correction(format!(
                    "{}: {} node factors and {} equilibrium arguments, expected {}",
                    c.name,
                    c.node_factors.len(),
                    c.equilibrium_arguments.len(),
                    n_years
                )));
            }
        }

        let mut years = Vec::with_capacity(n_years);
        for i in 0..n_years {
            let year = first_year + i as i32;
            let terms = constituents
                .iter()
                .map(|c| Term {
                    speed: c.speed,
                    amplitude: c.amplitude * c.node_factors[i],
                    phase: c.phase + c.equilibrium_arguments[i],
                })
                .collect();
            years.push(YearTerms {
                start: Timestamp::start_of_year(year)?,
                end: Timestamp::start_of_year(year + 1)?,
                terms,
            });
        }

        debug!(
            constituents = constituents.len(),
            first_year, n_years, "built astronomical constituent set"
        );
        Ok(Self {
            datum,
            first_year,
            years,
            constituents: constituents.len(),
        })
    }

    /// Years covered by the correction tables.
    pub fn years(&self) -> std::ops::Range<i32> {
        self.first_year..self.first_year + self.years.len() as i32
    }

    fn year_terms(&self, year: i32) -> Result<&YearTerms> {
        usize::try_from(year - self.first_year)
            .ok()
            .and_then(|i| self.years.get(i))
            .ok_or_else(|| {
                TideError::unsupported_correction(format!("no corrections for year {year}"))
            })
    }

    fn blended(
        &self,
        earlier: &YearTerms,
        later: &YearTerms,
        t: Timestamp,
        x: f64,
        order: u32,
    ) -> f64 {
        let f1 = earlier.derivatives(t, order);
        let f2 = later.derivatives(t, order);
        blend_derivative(&f1, &f2, x, BLEND_INTERVAL, order as usize)
    }
}

impl ConstituentSet for AstronomicalSet {
    fn datum(&self) -> Amplitude {
        self.datum
    }

    fn tide_derivative(&self, t: Timestamp, order: u32) -> Result<Amplitude> {
        let dimension = self.datum.dimension().derivative(order);
        if self.constituents == 0 {
            return Ok(Amplitude::new(0.0, dimension));
        }

        let year = t.year()?;
        let current = self.year_terms(year)?;
        let since = (t - current.start).as_secs_f64();
        let till = (current.end - t).as_secs_f64();

        // Neighbouring years outside the table are not blended.
        let value = if since <= BLEND_INTERVAL {
            match self.year_terms(year - 1) {
                Ok(previous) => self.blended(previous, current, t, since / BLEND_INTERVAL, order),
                Err(_) => current.evaluate(t, order),
            }
        } else if till <= BLEND_INTERVAL {
            match self.year_terms(year + 1) {
                Ok(next) => self.blended(current, next, t, -till / BLEND_INTERVAL, order),
                Err(_) => current.evaluate(t, order),
            }
        } else {
            current.evaluate(t, order)
        };
        Ok(Amplitude::new(value, dimension))
    }

    fn tide_derivative_max(&self, order: u32) -> Result<Amplitude> {
        let worst = self
            .years
            .iter()
            .map(|y| derivative_bound(&y.terms, order))
            .fold(0.0, f64::max);
        Ok(Amplitude::new(
            worst * DERIVATIVE_MAX_MARGIN,
            self.datum.dimension().derivative(order),
        ))
    }

    fn is_empty(&self) -> bool {
        self.constituents == 0
    }
}
