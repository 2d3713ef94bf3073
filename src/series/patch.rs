//! Merging time-adjacent epochs into patches.
//!
//! A patch is one logical, uniformly-stepped series built from one or more
//! epochs. Successive epochs join the current patch as long as the gap
//! after the patch end is at most two patch steps; a longer gap starts a
//! new patch. An epoch that ends before the patch end adds nothing and is
//! dropped. The patch step is the coarsest step of its epochs.
//!
//! ```text
//!  epochs   |-----|  |------|         |----|
//!                  ^ gap <= 2 step    ^ gap > 2 step
//!  patches  |---------------|         |----|
//! ```

use std::ops::Range;

use tracing::{debug, warn};

use super::epoch::{Epoch, EpochId};
use crate::types::{Interval, Timestamp};

/// First and last sample times of one epoch kept in a patch set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EpochSpan {
    /// Epoch whose readings back this span.
    pub id: EpochId,
    /// Time of the first reading.
    pub first: Timestamp,
    /// Time of the last reading.
    pub last: Timestamp,
    /// Reading spacing.
    pub step: Interval,
    /// Number of readings.
    pub count: usize,
}

impl EpochSpan {
    fn from_epoch(epoch: &Epoch) -> Self {
        Self {
            id: epoch.id,
            first: epoch.start,
            last: epoch.last(),
            step: epoch.step,
            count: epoch.count,
        }
    }
}

/// A contiguous logical series spanning one or more epochs.
#[derive(Clone, Debug, PartialEq)]
pub struct Patch {
    start: Timestamp,
    step: Interval,
    size: usize,
    spans: Range<usize>,
}

impl Patch {
    /// Time of the first logical sample.
    pub fn start(&self) -> Timestamp {
        self.start
    }

    /// Logical sample spacing.
    pub fn step(&self) -> Interval {
        self.step
    }

    /// Number of logical samples.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Time of the last logical sample.
    pub fn last(&self) -> Timestamp {
        self.start + self.step * (self.size as i64 - 1)
    }

    /// Offset of the patch start from an analysis epoch.
    pub fn offset_from(&self, epoch: Timestamp) -> Interval {
        self.start - epoch
    }

    /// Indices of this patch's epochs in [`PatchSet::spans`].
    pub fn span_range(&self) -> Range<usize> {
        self.spans.clone()
    }
}

/// The ordered patches of one station plus their epoch lookup table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PatchSet {
    spans: Vec<EpochSpan>,
    patches: Vec<Patch>,
}

/// Patch under construction.
struct OpenPatch {
    start: Timestamp,
    step: Interval,
    last: Timestamp,
    first_span: usize,
}

impl OpenPatch {
    fn close(self, end_span: usize) -> Patch {
        let size = ((self.last - self.start) / self.step) as usize + 1;
        Patch {
            start: self.start,
            step: self.step,
            size,
            spans: self.first_span..end_span,
        }
    }
}

impl PatchSet {
    /// Merge epochs into patches.
    ///
    /// Epochs are taken in order of start time. Empty epochs and epochs
    /// with a non-positive step are ignored.
    pub fn build(epochs: &[Epoch]) -> Self {
        let mut ordered: Vec<&Epoch> = epochs
            .iter()
            .filter(|e| {
                if e.is_empty() {
                    return false;
                }
                if e.step <= Interval::ZERO {
                    warn!(epoch = %e.id, step = %e.step, "ignoring epoch with non-positive step");
                    return false;
                }
                true
            })
            .collect();
        ordered.sort_by_key(|e| e.start);

        let mut spans = Vec::with_capacity(ordered.len());
        let mut patches = Vec::new();
        let mut open: Option<OpenPatch> = None;

        for epoch in ordered {
            let last = epoch.last();
            match open.as_mut() {
                Some(current) if current.last + current.step * 2 >= epoch.start => {
                    if last < current.last {
                        debug!(epoch = %epoch.id, "skipping redundant epoch");
                        continue;
                    }
                    if epoch.step > current.step {
                        current.step = epoch.step;
                    }
                    current.last = last;
                }
                _ => {
                    if let Some(done) = open.take() {
                        patches.push(done.close(spans.len()));
                    }
                    open = Some(OpenPatch {
                        start: epoch.start,
                        step: epoch.step,
                        last,
                        first_span: spans.len(),
                    });
                }
            }
            spans.push(EpochSpan::from_epoch(epoch));
        }
        if let Some(done) = open {
            patches.push(done.close(spans.len()));
        }

        debug!(
            epochs = epochs.len(),
            kept = spans.len(),
            patches = patches.len(),
            "built patch set"
        );
        Self { spans, patches }
    }

    /// Keep only the most recent `max_samples` logical samples.
    ///
    /// Whole patches are dropped from the front; the earliest retained
    /// patch is shortened so the total does not exceed the limit.
    pub fn window(&self, max_samples: usize) -> Self {
        if self.total_samples() <= max_samples {
            return self.clone();
        }

        let mut remaining = max_samples;
        let mut kept = Vec::new();
        for patch in self.patches.iter().rev() {
            if remaining == 0 {
                break;
            }
            if patch.size <= remaining {
                remaining -= patch.size;
                kept.push(patch.clone());
                continue;
            }
            let start = patch.last() - patch.step * (remaining as i64 - 1);
            let first_span = self.spans[patch.spans.clone()]
                .iter()
                .position(|s| s.last >= start)
                .map_or(patch.spans.end, |i| patch.spans.start + i);
            kept.push(Patch {
                start,
                step: patch.step,
                size: remaining,
                spans: first_span..patch.spans.end,
            });
            remaining = 0;
        }
        kept.reverse();

        // Re-base span ranges onto a compacted table.
        let mut spans = Vec::new();
        let patches = kept
            .into_iter()
            .map(|p| {
                let base = spans.len();
                spans.extend_from_slice(&self.spans[p.spans.clone()]);
                Patch {
                    spans: base..spans.len(),
                    ..p
                }
            })
            .collect();

        debug!(max_samples, "windowed patch set");
        Self { spans, patches }
    }

    /// Patches in time order.
    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    /// Epoch lookup table shared by all patches.
    pub fn spans(&self) -> &[EpochSpan] {
        &self.spans
    }

    /// Epochs of one patch.
    pub fn spans_of(&self, patch: &Patch) -> &[EpochSpan] {
        &self.spans[patch.spans.clone()]
    }

    /// Number of patches.
    pub fn len(&self) -> usize {
        self.patches.len()
    }

    /// True when there is no data at all.
    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// Sum of patch sizes.
    pub fn total_samples(&self) -> usize {
        self.patches.iter().map(Patch::size).sum()
    }

    /// Start of the first patch, used as the analysis epoch.
    pub fn epoch(&self) -> Option<Timestamp> {
        self.patches.first().map(Patch::start)
    }

    /// Time of the newest stored reading.
    pub fn last_data_point(&self) -> Option<Timestamp> {
        self.spans.last().map(|s| s.last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hourly(id: u32, start_hours: i64, count: usize) -> Epoch {
        Epoch::new(
            EpochId(id),
            Timestamp::from_seconds(start_hours * 3600),
            Interval::from_hours(1),
            count,
        )
    }

    #[test]
    fn test_empty() {
        let set = PatchSet::build(&[]);
        assert!(set.is_empty());
        assert_eq!(set.epoch(), None);
        assert_eq!(set.last_data_point(), None);
    }

    #[test]
    fn test_merge_within_two_steps() {
        // 0..9 h, then 11..20 h: gap of two steps merges
        let set = PatchSet::build(&[hourly(1, 0, 10), hourly(2, 11, 10)]);
        assert_eq!(set.len(), 1);
        let p = &set.patches()[0];
        assert_eq!(p.size(), 21);
        assert_eq!(p.last().seconds(), 20 * 3600);
        assert_eq!(set.spans_of(p).len(), 2);
    }

    #[test]
    fn test_split_on_long_gap() {
        let set = PatchSet::build(&[hourly(1, 0, 10), hourly(2, 12, 10)]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.patches()[1].start().seconds(), 12 * 3600);
        assert_eq!(set.total_samples(), 20);
    }

    #[test]
    fn test_redundant_epoch_skipped() {
        let set = PatchSet::build(&[hourly(1, 0, 24), hourly(2, 5, 3), hourly(3, 24, 4)]);
        assert_eq!(set.len(), 1);
        let ids: Vec<u32> = set.spans().iter().map(|s| s.id.0).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(set.patches()[0].size(), 28);
    }

    #[test]
    fn test_coarser_step_widens_patch() {
        let fine = Epoch::new(EpochId(1), Timestamp::from_seconds(0), Interval::from_minutes(6), 11);
        let coarse = Epoch::new(
            EpochId(2),
            Timestamp::from_seconds(3600),
            Interval::from_hours(1),
            3,
        );
        let set = PatchSet::build(&[fine, coarse]);
        let p = &set.patches()[0];
        assert_eq!(p.step(), Interval::from_hours(1));
        assert_eq!(p.size(), 4);
    }

    #[test]
    fn test_partition_covers_each_epoch_once() {
        let epochs = vec![
            hourly(4, 100, 5),
            hourly(1, 0, 10),
            hourly(2, 10, 10),
            hourly(3, 50, 10),
        ];
        let set = PatchSet::build(&epochs);
        let mut seen: Vec<u32> = set
            .patches()
            .iter()
            .flat_map(|p| set.spans_of(p).iter().map(|s| s.id.0))
            .collect();
        seen.sort();
        assert_eq!(seen, vec![1, 2, 3, 4]);

        for p in set.patches() {
            let spans = set.spans_of(p);
            for pair in spans.windows(2) {
                assert!(pair[0].last + p.step() * 2 >= pair[1].first);
            }
        }
        for pair in set.patches().windows(2) {
            assert!(pair[0].last() + pair[0].step() * 2 < pair[1].start());
        }
    }

    #[test]
    fn test_window_keeps_newest_samples() {
        let set = PatchSet::build(&[hourly(1, 0, 10), hourly(2, 20, 10), hourly(3, 30, 10)]);
        assert_eq!(set.len(), 2);

        let w = set.window(15);
        assert_eq!(w.total_samples(), 15);
        assert_eq!(w.len(), 1);
        let p = &w.patches()[0];
        assert_eq!(p.last().seconds(), 39 * 3600);
        assert_eq!(p.start().seconds(), 25 * 3600);
        assert_eq!(w.spans().len(), 2);

        let untouched = set.window(1000);
        assert_eq!(untouched, set);
    }

    #[test]
    fn test_offset_from_epoch() {
        let set = PatchSet::build(&[hourly(1, 0, 2), hourly(2, 10, 2)]);
        let epoch = set.epoch().unwrap();
        assert_eq!(set.patches()[1].offset_from(epoch), Interval::from_hours(10));
    }
}
