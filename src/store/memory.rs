//! In-memory reading source and coefficient store.

use std::collections::HashMap;

use super::{CoefficientStore, ReadingSource, StoredCoefficients};
use crate::error::StoreError;
use crate::series::{Epoch, EpochId, StationId};
use crate::types::Dimension;

/// Reading source and coefficient store backed by hash maps.
///
/// Used by tests and small tools that load readings from text files.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    epochs: HashMap<StationId, Vec<Epoch>>,
    readings: HashMap<EpochId, Vec<f64>>,
    dimensions: HashMap<StationId, Dimension>,
    coefficients: HashMap<StationId, StoredCoefficients>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an epoch and its readings for a station.
    pub fn insert_epoch(&mut self, station: StationId, epoch: Epoch, readings: Vec<f64>) {
        self.epochs.entry(station).or_default().push(epoch);
        self.readings.insert(epoch.id, readings);
    }

    /// Declare the dimension of a station's readings (meters by default).
    pub fn set_dimension(&mut self, station: StationId, dimension: Dimension) {
        self.dimensions.insert(station, dimension);
    }

    /// Next unused epoch identifier.
    pub fn next_epoch_id(&self) -> EpochId {
        EpochId(self.readings.keys().map(|id| id.0 + 1).max().unwrap_or(1))
    }

    /// Stations with at least one epoch.
    pub fn stations(&self) -> Vec<StationId> {
        let mut ids: Vec<StationId> = self.epochs.keys().copied().collect();
        ids.sort();
        ids
    }
}

impl ReadingSource for MemoryStore {
    fn epochs(&self, station: StationId) -> Result<Vec<Epoch>, StoreError> {
        Ok(self.epochs.get(&station).cloned().unwrap_or_default())
    }

    fn readings(&self, epoch: EpochId) -> Result<Vec<f64>, StoreError> {
        self.readings
            .get(&epoch)
            .cloned()
            .ok_or(StoreError::UnknownEpoch(epoch.0))
    }

    fn dimension(&self, station: StationId) -> Result<Dimension, StoreError> {
        Ok(self
            .dimensions
            .get(&station)
            .copied()
            .unwrap_or(Dimension::LENGTH))
    }
}

impl CoefficientStore for MemoryStore {
    fn load_coefficients(
        &self,
        station: StationId,
    ) -> Result<Option<StoredCoefficients>, StoreError> {
        Ok(self.coefficients.get(&station).cloned())
    }

    fn store_coefficients(
        &mut self,
        station: StationId,
        coefficients: StoredCoefficients,
    ) -> Result<(), StoreError> {
        self.coefficients.insert(station, coefficients);
        Ok(())
    }

    fn delete_coefficients(&mut self, station: StationId) -> Result<(), StoreError> {
        self.coefficients.remove(&station);
        Ok(())
    }
}
