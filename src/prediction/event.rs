//! Tide events and their time-ordered collection.

use std::collections::BTreeMap;
use std::fmt;

use crate::types::{Amplitude, Timestamp};

/// Kind of a predicted event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TideEventType {
    /// Local maximum of the level.
    Max,
    /// Local minimum of the level.
    Min,
    /// Current turns from ebb to flood.
    SlackRise,
    /// Current turns from flood to ebb.
    SlackFall,
    /// Level rises through the mark.
    MarkRise,
    /// Level falls through the mark.
    MarkFall,
    /// Level sampled on a regular grid.
    RawReading,
    /// No events could be predicted.
    Invalid,
}

/// A single predicted event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TideEvent {
    /// When the event occurs.
    pub time: Timestamp,
    /// What happens.
    pub kind: TideEventType,
    /// Predicted level at `time` (unset for invalid events).
    pub level: Amplitude,
}

impl TideEvent {
    /// Create an event.
    pub fn new(time: Timestamp, kind: TideEventType, level: Amplitude) -> Self {
        Self { time, kind, level }
    }

    /// The "cannot predict" marker.
    pub fn invalid(time: Timestamp) -> Self {
        Self::new(time, TideEventType::Invalid, Amplitude::UNSET)
    }

    /// True for maxima and minima.
    pub fn is_max_min(&self) -> bool {
        matches!(self.kind, TideEventType::Max | TideEventType::Min)
    }

    /// True when the level is a current.
    pub fn is_current(&self) -> bool {
        self.level.is_current()
    }

    /// A current extremum on the "wrong" side of zero: a maximum that is
    /// still ebbing or a minimum that is still flooding.
    pub fn is_min_current(&self) -> bool {
        self.is_current()
            && match self.kind {
                TideEventType::Max => self.level.value() < 0.0,
                TideEventType::Min => self.level.value() > 0.0,
                _ => false,
            }
    }

    /// Human-readable event name.
    pub fn description(&self) -> &'static str {
        use TideEventType::*;
        let current = self.is_current();
        match self.kind {
            Max if !current => "High Tide",
            Max if self.is_min_current() => "Min Ebb",
            Max => "Max Flood",
            Min if !current => "Low Tide",
            Min if self.is_min_current() => "Min Flood",
            Min => "Max Ebb",
            SlackRise => "Slack, Flood Begins",
            SlackFall => "Slack, Ebb Begins",
            MarkRise if current => "Mark, Current Increasing",
            MarkRise => "Mark Rising",
            MarkFall if current => "Mark, Current Decreasing",
            MarkFall => "Mark Falling",
            RawReading => "Raw Reading",
            Invalid => "Cannot find any events",
        }
    }

    /// Short machine-friendly event name.
    pub fn short_name(&self) -> &'static str {
        use TideEventType::*;
        let current = self.is_current();
        match self.kind {
            Max if !current => "high-tide",
            Max if self.is_min_current() => "min-ebb",
            Max => "max-flood",
            Min if !current => "low-tide",
            Min if self.is_min_current() => "min-flood",
            Min => "max-ebb",
            SlackRise => "slack-rise",
            SlackFall => "slack-fall",
            MarkRise => "mark-rise",
            MarkFall => "mark-fall",
            RawReading => "raw-reading",
            Invalid => "invalid",
        }
    }
}

impl fmt::Display for TideEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.level.is_set() {
            write!(f, "{} {} {:.3}", self.time, self.description(), self.level)
        } else {
            write!(f, "{} {}", self.time, self.description())
        }
    }
}

/// Time-ordered multi-map of events.
///
/// Several events may share a timestamp, but an event with the same time
/// and kind as one already present is not inserted twice.
#[derive(Clone, Debug, Default)]
pub struct TideEventOrganizer {
    events: BTreeMap<Timestamp, Vec<TideEvent>>,
}

impl TideEventOrganizer {
    /// Create an empty organizer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an event; returns `false` for a same-time, same-kind duplicate.
    pub fn insert(&mut self, event: TideEvent) -> bool {
        let slot = self.events.entry(event.time).or_default();
        if slot.iter().any(|e| e.kind == event.kind) {
            return false;
        }
        slot.push(event);
        true
    }

    /// Merge another organizer into this one.
    pub fn extend(&mut self, other: TideEventOrganizer) {
        for event in other.iter() {
            self.insert(*event);
        }
    }

    /// Events in time order.
    pub fn iter(&self) -> impl Iterator<Item = &TideEvent> + '_ {
        self.events.values().flatten()
    }

    /// Events with `start <= time < end`.
    pub fn range(&self, start: Timestamp, end: Timestamp) -> impl Iterator<Item = &TideEvent> + '_ {
        self.events.range(start..end).flat_map(|(_, v)| v.iter())
    }

    /// Earliest event.
    pub fn first(&self) -> Option<&TideEvent> {
        self.events.values().next().and_then(|v| v.first())
    }

    /// Latest event.
    pub fn last(&self) -> Option<&TideEvent> {
        self.events.values().next_back().and_then(|v| v.last())
    }

    /// Total number of events.
    pub fn len(&self) -> usize {
        self.events.values().map(Vec::len).sum()
    }

    /// True when no event has been inserted.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events in time order, by value.
    pub fn to_vec(&self) -> Vec<TideEvent> {
        self.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: i64, kind: TideEventType, level: f64) -> TideEvent {
        TideEvent::new(Timestamp::from_seconds(s), kind, Amplitude::meters(level))
    }

    #[test]
    fn test_organizer_orders_and_suppresses_duplicates() {
        let mut org = TideEventOrganizer::new();
        assert!(org.insert(at(300, TideEventType::Min, -1.0)));
        assert!(org.insert(at(100, TideEventType::Max, 1.0)));
        assert!(org.insert(at(100, TideEventType::MarkRise, 0.5)));
        assert!(!org.insert(at(100, TideEventType::Max, 1.0)));

        let times: Vec<i64> = org.iter().map(|e| e.time.seconds()).collect();
        assert_eq!(times, vec![100, 100, 300]);
        assert_eq!(org.len(), 3);
        assert_eq!(org.first().unwrap().kind, TideEventType::Max);
        assert_eq!(org.last().unwrap().kind, TideEventType::Min);
        assert_eq!(
            org.range(Timestamp::from_seconds(0), Timestamp::from_seconds(300))
                .count(),
            2
        );
    }

    #[test]
    fn test_descriptions_for_heights() {
        assert_eq!(at(0, TideEventType::Max, 1.0).description(), "High Tide");
        assert_eq!(at(0, TideEventType::Min, -1.0).short_name(), "low-tide");
        assert_eq!(at(0, TideEventType::MarkFall, 0.0).description(), "Mark Falling");
        let invalid = TideEvent::invalid(Timestamp::from_seconds(0));
        assert_eq!(invalid.description(), "Cannot find any events");
        assert_eq!(invalid.short_name(), "invalid");
        assert!(!invalid.is_current());
    }

    #[test]
    fn test_descriptions_for_currents() {
        let flood = TideEvent::new(
            Timestamp::from_seconds(0),
            TideEventType::Max,
            Amplitude::meters_per_second(1.2),
        );
        assert_eq!(flood.description(), "Max Flood");
        assert!(!flood.is_min_current());

        let weak_ebb = TideEvent::new(
            Timestamp::from_seconds(0),
            TideEventType::Max,
            Amplitude::meters_per_second(-0.1),
        );
        assert_eq!(weak_ebb.description(), "Min Ebb");
        assert!(weak_ebb.is_min_current());

        let ebb = TideEvent::new(
            Timestamp::from_seconds(0),
            TideEventType::Min,
            Amplitude::meters_per_second(-0.9),
        );
        assert_eq!(ebb.short_name(), "max-ebb");
        assert!(ebb.is_max_min());
    }
}
