//! Cursor over the logical samples of a patch set.
//!
//! Readings are fetched from the source one patch at a time when the
//! cursor enters the patch. Logical positions that coincide with a stored
//! sample return it exactly; anything else is a linear interpolation,
//! either between two samples of one epoch or across the gap between the
//! last sample of one epoch and the first sample of the next.

use super::patch::{Patch, PatchSet};
use crate::error::{Result, StoreError};
use crate::store::ReadingSource;
use crate::types::Timestamp;

/// Stateful cursor over a station's patches and their samples.
///
/// # Example
///
/// ```
/// use tide_harmonics::series::{Epoch, EpochId, PatchIterator, PatchSet};
/// use tide_harmonics::store::MemoryStore;
/// use tide_harmonics::types::{Interval, Timestamp};
/// use tide_harmonics::StationId;
///
/// let mut store = MemoryStore::new();
/// let epoch = Epoch::new(EpochId(1), Timestamp::from_seconds(0), Interval::from_hours(1), 3);
/// store.insert_epoch(StationId(7), epoch, vec![1.0, 2.0, 3.0]);
///
/// let patches = PatchSet::build(&[epoch]);
/// let mut it = PatchIterator::new(&store, &patches);
/// let mut sum = 0.0;
/// while it.next_patch().unwrap() {
///     for (_, reading) in it.samples() {
///         sum += reading;
///     }
/// }
/// assert_eq!(sum, 6.0);
/// ```
pub struct PatchIterator<'a, R: ReadingSource + ?Sized> {
    source: &'a R,
    set: &'a PatchSet,
    /// Active patch; `None` before the first `next_patch`.
    patch: Option<usize>,
    /// Readings of the active patch, one vector per span.
    readings: Vec<Vec<f64>>,
    /// Active span, as an absolute index into the span table.
    span: usize,
    stamp: Timestamp,
}

impl<'a, R: ReadingSource + ?Sized> PatchIterator<'a, R> {
    /// Create a cursor positioned before the first patch.
    pub fn new(source: &'a R, set: &'a PatchSet) -> Self {
        Self {
            source,
            set,
            patch: None,
            readings: Vec::new(),
            span: 0,
            stamp: Timestamp::UNIX_EPOCH,
        }
    }

    /// Rewind to before the first patch.
    pub fn reset(&mut self) {
        self.patch = None;
        self.readings.clear();
    }

    /// Move to the next patch and load its readings.
    ///
    /// Returns `false` once all patches have been visited.
    pub fn next_patch(&mut self) -> Result<bool> {
        let next = self.patch.map_or(0, |p| p + 1);
        if next >= self.set.len() {
            self.patch = Some(self.set.len());
            self.readings.clear();
            return Ok(false);
        }
        self.enter(next)?;
        Ok(true)
    }

    /// Jump to the last patch.
    ///
    /// Returns `false` when the set is empty.
    pub fn last_patch(&mut self) -> Result<bool> {
        match self.set.len() {
            0 => Ok(false),
            n => {
                self.enter(n - 1)?;
                Ok(true)
            }
        }
    }

    fn enter(&mut self, index: usize) -> Result<()> {
        let patch = &self.set.patches()[index];
        let mut readings = Vec::with_capacity(patch.span_range().len());
        for span in self.set.spans_of(patch) {
            let values = self.source.readings(span.id)?;
            if values.len() != span.count {
                return Err(StoreError::Backend(format!(
                    "{}: expected {} readings, got {}",
                    span.id,
                    span.count,
                    values.len()
                ))
                .into());
            }
            readings.push(values);
        }
        self.readings = readings;
        self.patch = Some(index);
        self.rewind_patch();
        Ok(())
    }

    /// Position one step before the first sample of the active patch.
    fn rewind_patch(&mut self) {
        if let Some(patch) = self.current() {
            self.stamp = patch.start() - patch.step();
            self.span = patch.span_range().start;
        }
    }

    /// The active patch.
    pub fn current(&self) -> Option<&'a Patch> {
        self.patch.and_then(|p| self.set.patches().get(p))
    }

    /// Step to the next logical sample of the active patch.
    ///
    /// Returns `false` when the patch is exhausted.
    pub fn advance(&mut self) -> bool {
        let Some(patch) = self.current() else {
            return false;
        };
        self.stamp += patch.step();
        if self.stamp > patch.last() {
            return false;
        }
        let spans = self.set.spans();
        let end = patch.span_range().end;
        while self.stamp > spans[self.span].last && self.span + 1 < end {
            self.span += 1;
        }
        true
    }

    /// Time of the current logical sample.
    pub fn stamp(&self) -> Timestamp {
        self.stamp
    }

    /// Reading at the current logical sample.
    pub fn reading(&self) -> f64 {
        let Some(patch) = self.current() else {
            return 0.0;
        };
        let spans = self.set.spans();
        let local = self.span - patch.span_range().start;
        let span = &spans[self.span];
        let values = &self.readings[local];

        if self.stamp < span.first {
            // Gap before this epoch; bridge from the previous epoch's last sample.
            if local == 0 {
                return values[0];
            }
            let prev = &spans[self.span - 1];
            let prev_last = self.readings[local - 1][prev.count - 1];
            let x = (self.stamp - prev.last).as_secs_f64() / (span.first - prev.last).as_secs_f64();
            return prev_last * (1.0 - x) + values[0] * x;
        }

        let delta = self.stamp - span.first;
        let index = (delta / span.step) as usize;
        let remainder = delta.seconds() % span.step.seconds();
        if remainder == 0 || index + 1 >= values.len() {
            return values[index.min(values.len() - 1)];
        }
        let x = remainder as f64 / span.step.as_secs_f64();
        values[index] * (1.0 - x) + values[index + 1] * x
    }

    /// Samples of the active patch, from its first logical position.
    pub fn samples(&mut self) -> Samples<'_, 'a, R> {
        self.rewind_patch();
        Samples { cursor: self }
    }

    /// Analysis epoch: start of the first patch.
    pub fn epoch(&self) -> Option<Timestamp> {
        self.set.epoch()
    }

    /// Time of the newest stored reading.
    pub fn last_data_point(&self) -> Option<Timestamp> {
        self.set.last_data_point()
    }
}

/// Iterator over `(time, reading)` pairs of one patch.
pub struct Samples<'c, 'a, R: ReadingSource + ?Sized> {
    cursor: &'c mut PatchIterator<'a, R>,
}

impl<R: ReadingSource + ?Sized> Iterator for Samples<'_, '_, R> {
    type Item = (Timestamp, f64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor.advance() {
            Some((self.cursor.stamp(), self.cursor.reading()))
        } else {
            None
        }
    }
}
