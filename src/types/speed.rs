//! Angular speed of a harmonic constituent.

use std::cmp::Ordering;
use std::f64::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TideError};

/// Relative tolerance under which two speeds name the same constituent.
pub const SPEED_TOLERANCE: f64 = 1e-7;

/// Angular frequency in radians per second, never negative.
///
/// Equality is approximate: astronomically derived frequencies that agree
/// to a relative tolerance of [`SPEED_TOLERANCE`] compare equal.
///
/// # Example
///
/// ```
/// use tide_harmonics::types::Speed;
///
/// let m2 = Speed::from_degrees_per_hour(28.9841042).unwrap();
/// let period_hours = 360.0 / m2.degrees_per_hour();
/// assert!((period_hours - 12.4206).abs() < 1e-3);
/// ```
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
#[repr(transparent)]
pub struct Speed(f64);

impl Speed {
    /// Zero speed (the datum term).
    pub const ZERO: Self = Self(0.0);

    /// Create a speed from radians per second.
    pub fn new(radians_per_second: f64) -> Result<Self> {
        if radians_per_second < 0.0 || radians_per_second.is_nan() {
            return Err(TideError::NegativeSpeed(radians_per_second));
        }
        Ok(Self(radians_per_second))
    }

    /// Create a speed without validation (for static tables).
    ///
    /// # Safety
    ///
    /// Caller must ensure the value is non-negative.
    #[inline]
    pub const fn new_unchecked(radians_per_second: f64) -> Self {
        Self(radians_per_second)
    }

    /// Create a speed from degrees per hour.
    pub fn from_degrees_per_hour(degrees_per_hour: f64) -> Result<Self> {
        Self::new(degrees_per_hour * PI / 648_000.0)
    }

    /// Create a speed from a period in seconds.
    pub fn from_period(seconds: f64) -> Result<Self> {
        Self::new(2.0 * PI / seconds)
    }

    /// Radians per second.
    #[inline]
    pub fn radians_per_second(self) -> f64 {
        self.0
    }

    /// Degrees per hour.
    #[inline]
    pub fn degrees_per_hour(self) -> f64 {
        self.0 * 648_000.0 / PI
    }

    /// Period in seconds, infinite for the datum.
    pub fn period(self) -> f64 {
        if self.0 == 0.0 {
            f64::INFINITY
        } else {
            2.0 * PI / self.0
        }
    }

    /// True for the zero-frequency datum term.
    #[inline]
    pub fn is_zero(self) -> bool {
        self.0 == 0.0
    }
}

impl PartialEq for Speed {
    fn eq(&self, other: &Self) -> bool {
        if self.0 == other.0 {
            return true;
        }
        let mean = 0.5 * (self.0 + other.0);
        (self.0 - other.0).abs() / mean < SPEED_TOLERANCE
    }
}

impl PartialOrd for Speed {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self == other {
            Some(Ordering::Equal)
        } else {
            self.0.partial_cmp(&other.0)
        }
    }
}

impl TryFrom<f64> for Speed {
    type Error = TideError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Speed> for f64 {
    #[inline]
    fn from(s: Speed) -> f64 {
        s.0
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.7} deg/h", self.degrees_per_hour())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degrees_per_hour_round_trip() {
        let s = Speed::from_degrees_per_hour(30.0).unwrap();
        assert!((s.radians_per_second() - 2.0 * PI / 43_200.0).abs() < 1e-15);
        assert!((s.degrees_per_hour() - 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_negative_rejected() {
        assert!(matches!(Speed::new(-1e-5), Err(TideError::NegativeSpeed(_))));
        assert!(Speed::from_degrees_per_hour(-15.0).is_err());
    }

    #[test]
    fn test_approximate_equality() {
        let a = Speed::new(1.405189e-4).unwrap();
        let b = Speed::new(1.405189e-4 * (1.0 + 1e-9)).unwrap();
        let c = Speed::new(1.405189e-4 * (1.0 + 1e-5)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a < c);
        assert_eq!(Speed::ZERO, Speed::new(0.0).unwrap());
    }

    #[test]
    fn test_period() {
        let s = Speed::from_period(86_400.0).unwrap();
        assert!((s.degrees_per_hour() - 15.0).abs() < 1e-12);
        assert!(Speed::ZERO.period().is_infinite());
    }
}
