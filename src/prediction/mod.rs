//! Tide level and event prediction.
//!
//! A [`Station`] borrows a constituent set and answers two questions: what
//! is the level at a given time, and which events (highs, lows, slacks,
//! mark crossings) occur in a range. Events are located to within
//! [`EVENT_PRECISION`] by a safeguarded Newton root finder.

mod event;
mod root;
mod station;

pub use event::{TideEvent, TideEventOrganizer, TideEventType};
pub use root::{EVENT_PRECISION, find_zero, find_zero_observed};
pub use station::{EventFilter, ExtremumKind, MaxMin, Station};
