//! # tide-harmonics
//!
//! Harmonic analysis of gapped tide and current records, and prediction of
//! tide events from the fitted constituents.
//!
//! This crate provides the core building blocks:
//! - Strongly typed instants, durations, speeds and dimensioned amplitudes
//! - A patch model that stitches irregular, gapped epochs into uniform series
//! - Harmonic analysis that separates constituents unresolvable over the record
//! - Constituent sets with constant or yearly corrected coefficients
//! - Level prediction and event finding (highs, lows, slacks, mark crossings)
//!
//! # Example
//!
//! ```
//! use tide_harmonics::{AnalysisConfig, EventFilter, HarmonicsCreator, MemoryStore, ModeCatalog};
//! use tide_harmonics::{Epoch, EpochId, Interval, StationId, Station, Timestamp};
//!
//! let catalog = ModeCatalog::standard().subset(&["M2"]);
//! let omega = catalog.get("M2").unwrap().speed.radians_per_second();
//! let count = 24 * 60;
//! let readings = (0..count).map(|h| 1.0 + (omega * 3600.0 * h as f64).cos()).collect();
//!
//! let mut store = MemoryStore::new();
//! let epoch = Epoch::new(EpochId(1), Timestamp::from_seconds(0), Interval::from_hours(1), count);
//! store.insert_epoch(StationId(1), epoch, readings);
//!
//! let creator = HarmonicsCreator::new(catalog, AnalysisConfig::default());
//! let set = creator.analyze(&mut store, StationId(1)).unwrap().unwrap();
//!
//! let station = Station::new(Some(&set));
//! let day = Interval::from_days(1);
//! let events = station
//!     .predict_events(Timestamp::from_seconds(0), Timestamp::from_seconds(0) + day, None, EventFilter::MaxMin)
//!     .unwrap();
//! assert!(events.len() >= 3);
//! ```

pub mod analysis;
pub mod constituents;
pub mod error;
pub mod io;
pub mod prediction;
pub mod series;
pub mod store;
pub mod types;

// Re-export main types for convenience
pub use analysis::{
    AnalysisConfig, FitMetrics, FittedConstituent, HarmonicFit, HarmonicsCreator, Mode,
    ModeCatalog,
};
pub use constituents::{AstronomicalConstituent, AstronomicalSet, ConstituentSet, RunningSet};
pub use error::{ConfigError, Result, StoreError, TideError};
pub use prediction::{EventFilter, Station, TideEvent, TideEventOrganizer, TideEventType};
pub use series::{Epoch, EpochId, PatchIterator, PatchSet, StationId};
pub use store::{CoefficientStore, MemoryStore, ReadingSource, StoredCoefficients};
pub use types::{Amplitude, Dimension, Interval, Speed, Timestamp};

// I/O types
pub use io::{ReadingsFile, ReadingsFileError, parse_readings, read_readings_file};
