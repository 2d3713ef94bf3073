//! Strongly-typed domain quantities.
//!
//! Newtypes keep instants, durations, frequencies and dimensioned
//! amplitudes apart so they cannot be mixed up in the analysis and
//! prediction code.
//!
//! # Example
//!
//! ```
//! use tide_harmonics::types::{Amplitude, Interval, Speed, Timestamp};
//!
//! let t0 = Timestamp::from_seconds(0);
//! let t1 = t0 + Interval::from_hours(6);
//! let s2 = Speed::from_degrees_per_hour(30.0).unwrap();
//!
//! // Half an S2 cycle in six hours
//! let phase = s2.radians_per_second() * (t1 - t0).as_secs_f64();
//! assert!((phase - std::f64::consts::PI).abs() < 1e-12);
//!
//! let height = Amplitude::meters(1.2);
//! assert_eq!(format!("{height}"), "1.2 m");
//! ```

mod amplitude;
mod speed;
mod time;

pub use amplitude::{Amplitude, AmplitudeParseError, Dimension};
pub use speed::{SPEED_TOLERANCE, Speed};
pub use time::{Interval, Timestamp};
