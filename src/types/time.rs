//! Absolute instants and signed durations, both in whole seconds.

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use chrono::{DateTime, Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TideError};

// =============================================================================
// Timestamp (POSIX seconds, UTC)
// =============================================================================

/// An absolute instant in POSIX seconds (UTC).
///
/// Timestamps are totally ordered and carry whole-second resolution,
/// which is finer than any event precision the predictor reports.
///
/// # Example
///
/// ```
/// use tide_harmonics::types::{Interval, Timestamp};
///
/// let t = Timestamp::from_seconds(3600);
/// assert_eq!((t + Interval::from_hours(1)).seconds(), 7200);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// The Unix epoch.
    pub const UNIX_EPOCH: Self = Self(0);

    /// Create a timestamp from POSIX seconds.
    #[inline]
    pub const fn from_seconds(seconds: i64) -> Self {
        Self(seconds)
    }

    /// POSIX seconds.
    #[inline]
    pub const fn seconds(self) -> i64 {
        self.0
    }

    /// Start of the given UTC calendar year.
    pub fn start_of_year(year: i32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| Self(dt.and_utc().timestamp()))
            .ok_or_else(|| TideError::TimestampOutOfRange(format!("year {year}")))
    }

    /// UTC calendar year containing this instant.
    pub fn year(self) -> Result<i32> {
        DateTime::from_timestamp(self.0, 0)
            .map(|dt| dt.year())
            .ok_or_else(|| TideError::TimestampOutOfRange(format!("{} s", self.0)))
    }

    /// Signed duration from `earlier` to `self`.
    #[inline]
    pub fn since(self, earlier: Timestamp) -> Interval {
        Interval(self.0 - earlier.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match DateTime::from_timestamp(self.0, 0) {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S UTC")),
            None => write!(f, "{}s", self.0),
        }
    }
}

impl Add<Interval> for Timestamp {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Interval) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign<Interval> for Timestamp {
    #[inline]
    fn add_assign(&mut self, rhs: Interval) {
        self.0 += rhs.0;
    }
}

impl Sub<Interval> for Timestamp {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Interval) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign<Interval> for Timestamp {
    #[inline]
    fn sub_assign(&mut self, rhs: Interval) {
        self.0 -= rhs.0;
    }
}

impl Sub for Timestamp {
    type Output = Interval;
    #[inline]
    fn sub(self, rhs: Self) -> Interval {
        Interval(self.0 - rhs.0)
    }
}

// =============================================================================
// Interval (signed duration in seconds)
// =============================================================================

/// A signed duration in whole seconds.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Interval(i64);

impl Interval {
    /// Zero duration.
    pub const ZERO: Self = Self(0);

    /// Create an interval from seconds.
    #[inline]
    pub const fn from_seconds(seconds: i64) -> Self {
        Self(seconds)
    }

    /// Create an interval from minutes.
    #[inline]
    pub const fn from_minutes(minutes: i64) -> Self {
        Self(minutes * 60)
    }

    /// Create an interval from hours.
    #[inline]
    pub const fn from_hours(hours: i64) -> Self {
        Self(hours * 3600)
    }

    /// Create an interval from days.
    #[inline]
    pub const fn from_days(days: i64) -> Self {
        Self(days * 86_400)
    }

    /// Whole seconds.
    #[inline]
    pub const fn seconds(self) -> i64 {
        self.0
    }

    /// Seconds as a float, for phase arithmetic.
    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64
    }

    /// Absolute value.
    #[inline]
    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// True for negative durations.
    #[inline]
    pub fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

impl Add for Interval {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Interval {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Neg for Interval {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Mul<i64> for Interval {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: i64) -> Self {
        Self(self.0 * rhs)
    }
}

impl Div<i64> for Interval {
    type Output = Self;
    #[inline]
    fn div(self, rhs: i64) -> Self {
        Self(self.0 / rhs)
    }
}

impl Div for Interval {
    type Output = i64;
    #[inline]
    fn div(self, rhs: Self) -> i64 {
        self.0 / rhs.0
    }
}
