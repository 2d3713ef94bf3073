//! Patch model for irregular, gapped reading series.
//!
//! Stored readings arrive as epochs: uniformly-stepped runs that may have
//! different steps and may be separated by gaps. Analysis works on patches,
//! where each patch merges time-adjacent epochs into one logical series that
//! can be iterated sample by sample.

mod epoch;
mod iterator;
mod patch;

pub use epoch::{Epoch, EpochId, StationId};
pub use iterator::{PatchIterator, Samples};
pub use patch::{EpochSpan, Patch, PatchSet};
