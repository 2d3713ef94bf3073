//! Harmonic analysis of gapped tide and current records.
//!
//! This module provides tools for:
//! - Building the catalog of candidate constituents
//! - Estimating constituent amplitudes over patched, non-uniform samples
//! - Separating constituents that cannot be resolved over the record
//! - Measuring how well a fit reproduces the observations
//!
//! # Mathematical Background
//!
//! The level is modelled as
//! ```text
//! r(t) = r₀ + Σᵢ |Cᵢ| cos(ωᵢ(t − t₀) + arg Cᵢ)
//! ```
//!
//! Where:
//! - r₀ is the datum (mean level)
//! - t₀ is the analysis epoch, the start of the first analyzed patch
//! - Cᵢ is the complex amplitude of constituent i
//!
//! Direct averages of `r(t)·exp(−iωt)` are computed in one pass over the
//! samples. Finite, gapped sampling leaks each constituent into its
//! neighbours; the leakage is known in closed form (see [`Coupling`]) and
//! is undone by solving a small linear system per group of
//! unresolvable constituents.
//!
//! # Example
//!
//! ```
//! use tide_harmonics::analysis::{AnalysisConfig, HarmonicsCreator, ModeCatalog};
//! use tide_harmonics::series::{Epoch, EpochId, StationId};
//! use tide_harmonics::store::MemoryStore;
//! use tide_harmonics::types::{Interval, Timestamp};
//!
//! let m2 = ModeCatalog::standard().subset(&["M2"]);
//! let speed = m2.get("M2").unwrap().speed.radians_per_second();
//!
//! let mut store = MemoryStore::new();
//! let count = 24 * 60;
//! let readings = (0..count)
//!     .map(|h| 2.0 + 0.7 * (speed * 3600.0 * h as f64).cos())
//!     .collect();
//! let epoch = Epoch::new(EpochId(1), Timestamp::from_seconds(0), Interval::from_hours(1), count);
//! store.insert_epoch(StationId(1), epoch, readings);
//!
//! let creator = HarmonicsCreator::new(m2, AnalysisConfig::default());
//! let fit = creator.fit(&store, StationId(1)).unwrap().unwrap();
//! assert!((fit.get("M2").unwrap().amplitude() - 0.7).abs() < 1e-2);
//! ```

mod catalog;
mod config;
mod coupling;
mod creator;
mod metrics;
mod selection;
mod solve;

pub use catalog::{DATUM_MODE, Mode, ModeCatalog};
pub use config::AnalysisConfig;
pub use coupling::{Coupling, factor};
pub use creator::{FittedConstituent, HarmonicFit, HarmonicsCreator, MAX_PRUNING_ROUNDS};
pub use metrics::FitMetrics;
pub use selection::{Candidate, amplitude_pass, check_group, group_by_resolution, slow_pass};
pub use solve::{Solved, solve_group};
