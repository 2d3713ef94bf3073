//! Stored runs of uniformly-stepped readings.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{Interval, Timestamp};

/// Identifier of a tide station.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationId(pub u32);

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "station {}", self.0)
    }
}

/// Identifier of a stored epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpochId(pub u32);

impl fmt::Display for EpochId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "epoch {}", self.0)
    }
}

/// An ordered, uniformly-stepped run of readings.
///
/// The readings themselves stay with the reading source; an epoch only
/// records where and how densely they were sampled.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Epoch {
    /// Identifier used to fetch the readings.
    pub id: EpochId,
    /// Time of the first reading.
    pub start: Timestamp,
    /// Spacing between readings.
    pub step: Interval,
    /// Number of readings.
    pub count: usize,
}

impl Epoch {
    /// Create an epoch descriptor.
    pub fn new(id: EpochId, start: Timestamp, step: Interval, count: usize) -> Self {
        Self {
            id,
            start,
            step,
            count,
        }
    }

    /// Time of the last reading (equal to `start` for empty epochs).
    pub fn last(&self) -> Timestamp {
        self.start + self.step * (self.count.saturating_sub(1) as i64)
    }

    /// True when the epoch holds no readings.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Time of the `index`-th reading.
    pub fn time_of(&self, index: usize) -> Timestamp {
        self.start + self.step * index as i64
    }
}
