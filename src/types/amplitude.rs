//! Dimensioned scalar amplitudes ("dotted meters").
//!
//! Tide heights are lengths, tidal currents are length per time, and the
//! k-th time derivative of a height carries one extra inverse time per
//! order. Each amplitude therefore keeps its integer length and time
//! exponents, and checked arithmetic refuses to mix them.
//!
//! # Text Format
//!
//! ```text
//! 1.5 m        height
//! 0.3 m/s      current speed
//! 0.01 m/s^2   rate of change of a current
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Mul, Neg};
use std::str::FromStr;

use thiserror::Error;

use crate::error::{Result, TideError};

// =============================================================================
// Dimension
// =============================================================================

/// Length and time exponents of a physical quantity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Dimension {
    /// Power of meters.
    pub length: i32,
    /// Power of seconds.
    pub time: i32,
}

impl Dimension {
    /// Dimensionless; used as the "not set" marker for amplitudes.
    pub const NONE: Self = Self::new(0, 0);
    /// Meters.
    pub const LENGTH: Self = Self::new(1, 0);
    /// Meters per second.
    pub const VELOCITY: Self = Self::new(1, -1);

    /// Create a dimension from exponents.
    pub const fn new(length: i32, time: i32) -> Self {
        Self { length, time }
    }

    /// Dimension of the `order`-th time derivative.
    pub const fn derivative(self, order: u32) -> Self {
        Self::new(self.length, self.time - order as i32)
    }

    fn unit(self) -> String {
        let mut unit = match self.length {
            0 => String::from("1"),
            1 => String::from("m"),
            l => format!("m^{l}"),
        };
        match self.time {
            0 => {}
            -1 => unit.push_str("/s"),
            t if t < 0 => unit.push_str(&format!("/s^{}", -t)),
            1 => unit.push_str("*s"),
            t => unit.push_str(&format!("*s^{t}")),
        }
        unit
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::NONE {
            write!(f, "notset")
        } else {
            write!(f, "{}", self.unit())
        }
    }
}

// =============================================================================
// Amplitude
// =============================================================================

/// A scalar value with length and time exponents.
///
/// # Example
///
/// ```
/// use tide_harmonics::types::Amplitude;
///
/// let datum = Amplitude::meters(1.0);
/// let swing = Amplitude::meters(0.5);
/// assert_eq!(datum.try_add(swing).unwrap().value(), 1.5);
/// assert!(datum.try_add(Amplitude::meters_per_second(0.2)).is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Amplitude {
    value: f64,
    dimension: Dimension,
}

impl Amplitude {
    /// Create an amplitude.
    #[inline]
    pub const fn new(value: f64, dimension: Dimension) -> Self {
        Self { value, dimension }
    }

    /// An amplitude with no dimension, meaning "not set".
    pub const UNSET: Self = Self::new(0.0, Dimension::NONE);

    /// A height in meters.
    #[inline]
    pub const fn meters(value: f64) -> Self {
        Self::new(value, Dimension::LENGTH)
    }

    /// A current speed in meters per second.
    #[inline]
    pub const fn meters_per_second(value: f64) -> Self {
        Self::new(value, Dimension::VELOCITY)
    }

    /// Meters with `derivative` dots, i.e. m/s^derivative.
    #[inline]
    pub const fn from_dotted_meters(value: f64, derivative: i32) -> Self {
        Self::new(value, Dimension::new(1, -derivative))
    }

    /// Raw value in SI units.
    #[inline]
    pub fn value(self) -> f64 {
        self.value
    }

    /// Length and time exponents.
    #[inline]
    pub fn dimension(self) -> Dimension {
        self.dimension
    }

    /// False for the dimensionless "not set" value.
    #[inline]
    pub fn is_set(self) -> bool {
        self.dimension != Dimension::NONE
    }

    /// True for velocities and their derivatives.
    #[inline]
    pub fn is_current(self) -> bool {
        self.dimension.time < 0
    }

    /// Same value, new dimension.
    #[inline]
    pub fn with_dimension(self, dimension: Dimension) -> Self {
        Self::new(self.value, dimension)
    }

    /// Absolute value.
    #[inline]
    pub fn abs(self) -> Self {
        Self::new(self.value.abs(), self.dimension)
    }

    /// Raise to an integer power; exponents scale with `p`.
    pub fn powi(self, p: i32) -> Self {
        Self::new(
            self.value.powi(p),
            Dimension::new(self.dimension.length * p, self.dimension.time * p),
        )
    }

    fn check(self, other: Self) -> Result<()> {
        if self.dimension == other.dimension {
            Ok(())
        } else {
            Err(TideError::dimension_mismatch(self.dimension, other.dimension))
        }
    }

    /// Sum of two amplitudes with identical dimensions.
    pub fn try_add(self, other: Self) -> Result<Self> {
        self.check(other)?;
        Ok(Self::new(self.value + other.value, self.dimension))
    }

    /// Difference of two amplitudes with identical dimensions.
    pub fn try_sub(self, other: Self) -> Result<Self> {
        self.check(other)?;
        Ok(Self::new(self.value - other.value, self.dimension))
    }

    /// Ordering of two amplitudes with identical dimensions.
    pub fn try_cmp(self, other: Self) -> Result<Ordering> {
        self.check(other)?;
        Ok(self.value.total_cmp(&other.value))
    }
}

impl Mul<f64> for Amplitude {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.value * rhs, self.dimension)
    }
}

impl Mul<Amplitude> for f64 {
    type Output = Amplitude;
    #[inline]
    fn mul(self, rhs: Amplitude) -> Amplitude {
        rhs * self
    }
}

impl Mul for Amplitude {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.value * rhs.value,
            Dimension::new(
                self.dimension.length + rhs.dimension.length,
                self.dimension.time + rhs.dimension.time,
            ),
        )
    }
}

impl Neg for Amplitude {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.value, self.dimension)
    }
}

impl fmt::Display for Amplitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_set() {
            return write!(f, "notset");
        }
        match f.precision() {
            Some(p) => write!(f, "{:.*} {}", p, self.value, self.dimension.unit()),
            None => write!(f, "{} {}", self.value, self.dimension.unit()),
        }
    }
}

/// Error parsing a dotted-meter string.
#[derive(Debug, Error, PartialEq)]
pub enum AmplitudeParseError {
    /// Leading number missing or malformed.
    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    /// Unit other than m, m/s or m/s^k.
    #[error("Unsupported unit: {0}")]
    UnsupportedUnit(String),
}

impl FromStr for Amplitude {
    type Err = AmplitudeParseError;

    /// Parse `"<value> m"`, `"<value> m/s"` or `"<value> m/s^k"`.
    ///
    /// A bare number is taken as meters; `"notset"` gives [`Amplitude::UNSET`].
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("notset") {
            return Ok(Self::UNSET);
        }

        let split = s
            .find(|c: char| c.is_ascii_alphabetic() && c != 'e' && c != 'E')
            .unwrap_or(s.len());
        let (number, unit) = s.split_at(split);
        let value: f64 = number
            .trim()
            .parse()
            .map_err(|_| AmplitudeParseError::InvalidNumber(number.trim().to_string()))?;

        let unit: String = unit.chars().filter(|c| !c.is_whitespace()).collect();
        let derivative = match unit.as_str() {
            "" | "m" => 0,
            "m/s" => 1,
            other => other
                .strip_prefix("m/s^")
                .and_then(|k| k.parse::<i32>().ok())
                .filter(|k| *k >= 0)
                .ok_or_else(|| AmplitudeParseError::UnsupportedUnit(other.to_string()))?,
        };
        Ok(Self::from_dotted_meters(value, derivative))
    }
}
