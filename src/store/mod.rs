//! Collaborator contracts for reading sources and coefficient stores.
//!
//! The engine never touches persistence directly. Readings come from a
//! [`ReadingSource`], and fitted coefficients are memoized through a
//! [`CoefficientStore`]. [`MemoryStore`] implements both in memory.

mod memory;

pub use memory::MemoryStore;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::constituents::{ConstituentSet, RunningSet};
use crate::error::StoreError;
use crate::series::{Epoch, EpochId, StationId};
use crate::types::{Amplitude, Dimension, Speed, Timestamp};

/// Supplies epochs and their readings.
pub trait ReadingSource {
    /// Epochs recorded for a station; an unknown station has none.
    fn epochs(&self, station: StationId) -> Result<Vec<Epoch>, StoreError>;

    /// Readings of one epoch, `epoch.count` values in time order.
    fn readings(&self, epoch: EpochId) -> Result<Vec<f64>, StoreError>;

    /// Physical dimension of the station's readings.
    fn dimension(&self, _station: StationId) -> Result<Dimension, StoreError> {
        Ok(Dimension::LENGTH)
    }
}

/// Persists fitted coefficients per station.
pub trait CoefficientStore {
    /// Previously stored coefficients, if any.
    fn load_coefficients(&self, station: StationId)
    -> Result<Option<StoredCoefficients>, StoreError>;

    /// Store (or replace) a station's coefficients.
    fn store_coefficients(
        &mut self,
        station: StationId,
        coefficients: StoredCoefficients,
    ) -> Result<(), StoreError>;

    /// Remove a station's coefficients; removing nothing is not an error.
    fn delete_coefficients(&mut self, station: StationId) -> Result<(), StoreError>;
}

/// Serializable form of a fitted constituent set.
///
/// The datum is stored as the zero-speed entry; its real part is the
/// datum value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredCoefficients {
    /// Reference instant of the phases.
    pub epoch: Timestamp,
    /// `(speed, complex amplitude)` pairs.
    pub coefficients: Vec<(Speed, Complex64)>,
}

impl StoredCoefficients {
    /// Capture a running set.
    pub fn from_running_set(set: &RunningSet) -> Self {
        let mut coefficients = vec![(Speed::ZERO, Complex64::new(set.datum().value(), 0.0))];
        coefficients.extend(set.coefficients());
        Self {
            epoch: set.epoch(),
            coefficients,
        }
    }

    /// Rebuild a running set whose values carry `dimension`.
    pub fn to_running_set(&self, dimension: Dimension) -> RunningSet {
        let datum = self
            .coefficients
            .iter()
            .find(|(s, _)| s.is_zero())
            .map_or(0.0, |(_, c)| c.re);
        let mut set = RunningSet::new(Amplitude::new(datum, dimension), self.epoch);
        for (speed, c) in self.coefficients.iter().filter(|(s, _)| !s.is_zero()) {
            set.append_complex(*c, *speed);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constituents::ConstituentSet;

    #[test]
    fn test_running_set_round_trip() {
        let mut set = RunningSet::new(Amplitude::meters(1.2), Timestamp::from_seconds(500));
        set.append_complex(
            Complex64::from_polar(0.8, 0.3),
            Speed::from_degrees_per_hour(28.9841042).unwrap(),
        );
        let stored = StoredCoefficients::from_running_set(&set);
        assert_eq!(stored.coefficients.len(), 2);
        assert!(stored.coefficients[0].0.is_zero());

        let back = stored.to_running_set(Dimension::LENGTH);
        let t = Timestamp::from_seconds(12_345);
        let a = set.tide_derivative(t, 0).unwrap().value();
        let b = back.tide_derivative(t, 0).unwrap().value();
        assert!((a - b).abs() < 1e-12);
        assert_eq!(back.datum(), Amplitude::meters(1.2));
    }

    #[test]
    fn test_serde_json() {
        let stored = StoredCoefficients {
            epoch: Timestamp::from_seconds(86_400),
            coefficients: vec![
                (Speed::ZERO, Complex64::new(0.5, 0.0)),
                (Speed::new(1e-4).unwrap(), Complex64::new(0.1, -0.2)),
            ],
        };
        let json = serde_json::to_string(&stored).unwrap();
        let back: StoredCoefficients = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stored);
        assert!(serde_json::from_str::<Speed>("-1.0").is_err());
    }
}
