//! Level and event prediction for one station.
//!
//! # Event Scan
//!
//! Between two consecutive extrema the level is monotonic, so each
//! max/min bracket contains at most one crossing of any fixed level. The
//! scan walks from extremum to extremum:
//!
//! ```text
//! cursor ──► next max/min ──► search [previous, this] for slack / mark
//!    ▲                                        │
//!    └──────────── advance to extremum ◄──────┘
//! ```
//!
//! Extrema are the zeros of the first derivative. They are bracketed by
//! stepping forward with step sizes bounded by the second and third
//! derivative maxima, then refined with [`find_zero`].

use tracing::debug;

use super::event::{TideEvent, TideEventOrganizer, TideEventType};
use super::root::{EVENT_PRECISION, find_zero, seconds_to_interval};
use crate::constituents::ConstituentSet;
use crate::error::{Result, TideError};
use crate::types::{Amplitude, Interval, Timestamp};

/// Slopes within this fraction of the slope bound count as zero.
const SLOPE_EPSILON: f64 = 1e-12;

/// Which events `predict_events` reports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EventFilter {
    /// Extrema, slacks and mark crossings.
    #[default]
    NoFilter,
    /// Extrema and slacks.
    KnownTideEvents,
    /// Extrema only.
    MaxMin,
}

/// Kind of the next extremum.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtremumKind {
    /// Local maximum.
    Max,
    /// Local minimum.
    Min,
}

/// Result of [`Station::next_max_min`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaxMin {
    /// Maximum or minimum.
    pub kind: ExtremumKind,
    /// Time of the extremum, if the bracket could be refined.
    pub time: Option<Timestamp>,
    /// Right end of the bracket that contained it.
    pub bracket_end: Timestamp,
}

impl MaxMin {
    /// Where the scan continues from.
    pub fn resume_at(&self) -> Timestamp {
        self.time.unwrap_or(self.bracket_end)
    }
}

/// A station's prediction interface over a borrowed constituent set.
///
/// # Example
///
/// ```
/// use tide_harmonics::constituents::RunningSet;
/// use tide_harmonics::prediction::{EventFilter, Station};
/// use tide_harmonics::types::{Amplitude, Interval, Speed, Timestamp};
///
/// let epoch = Timestamp::from_seconds(0);
/// let mut set = RunningSet::new(Amplitude::meters(1.0), epoch);
/// set.append(Amplitude::meters(0.8), Speed::from_degrees_per_hour(30.0).unwrap(), 0.0)
///     .unwrap();
///
/// let station = Station::new(Some(&set));
/// let events = station
///     .predict_events(epoch, epoch + Interval::from_days(1), None, EventFilter::NoFilter)
///     .unwrap();
/// // Low at 6 h, high at 12 h, low at 18 h
/// assert_eq!(events.len(), 3);
/// ```
pub struct Station<'a> {
    set: Option<&'a dyn ConstituentSet>,
    precision: Interval,
}

impl<'a> Station<'a> {
    /// Create a station; `None` means no harmonic result is available.
    pub fn new(set: Option<&'a dyn ConstituentSet>) -> Self {
        Self {
            set,
            precision: EVENT_PRECISION,
        }
    }

    /// Override the event precision.
    pub fn with_precision(mut self, precision: Interval) -> Self {
        self.precision = precision.max(Interval::from_seconds(1));
        self
    }

    /// The constituent set, if any.
    pub fn constituents(&self) -> Option<&'a dyn ConstituentSet> {
        self.set
    }

    /// True when events can be predicted: a non-empty set whose level
    /// actually varies.
    pub fn is_valid(&self) -> Result<bool> {
        match self.set {
            Some(set) if !set.is_empty() => Ok(set.tide_derivative_max(2)?.value() > 0.0),
            _ => Ok(false),
        }
    }

    fn valid_set(&self) -> Result<Option<&'a dyn ConstituentSet>> {
        Ok(if self.is_valid()? { self.set } else { None })
    }

    /// Predicted level at `t`, or `None` without constituents.
    pub fn predict_level(&self, t: Timestamp) -> Result<Option<Amplitude>> {
        match self.set {
            Some(set) => Ok(Some(set.datum().try_add(set.tide_derivative(t, 0)?)?)),
            None => Ok(None),
        }
    }

    fn level(&self, set: &dyn ConstituentSet, t: Timestamp) -> Result<Amplitude> {
        set.datum().try_add(set.tide_derivative(t, 0)?)
    }

    /// Predict events in `[start, end)`.
    ///
    /// A degenerate range yields one invalid event at `start`; a station
    /// without a usable constituent set yields one invalid event at `end`.
    /// A mark whose dimension differs from the station's levels is an
    /// error.
    pub fn predict_events(
        &self,
        start: Timestamp,
        end: Timestamp,
        mark: Option<Amplitude>,
        filter: EventFilter,
    ) -> Result<TideEventOrganizer> {
        let mut organizer = TideEventOrganizer::new();
        if start >= end {
            organizer.insert(TideEvent::invalid(start));
            return Ok(organizer);
        }
        let Some(set) = self.valid_set()? else {
            organizer.insert(TideEvent::invalid(end));
            return Ok(organizer);
        };
        if let Some(mark) = mark {
            if !set.mark_compatible(mark) {
                return Err(TideError::dimension_mismatch(
                    set.datum().dimension(),
                    mark.dimension(),
                ));
            }
        }

        let in_range = |t: Timestamp| t >= start && t < end;
        let slack = if filter != EventFilter::MaxMin && set.is_current() {
            Some(Amplitude::new(0.0, set.datum().dimension()))
        } else {
            None
        };
        let mark = mark.filter(|_| filter == EventFilter::NoFilter);

        let mut previous = start;
        let mut cursor = start;
        while cursor <= end {
            let extremum = self.next_extremum(set, cursor)?;
            let found = extremum.resume_at();

            if let Some(time) = extremum.time.filter(|t| in_range(*t)) {
                let kind = match extremum.kind {
                    ExtremumKind::Max => TideEventType::Max,
                    ExtremumKind::Min => TideEventType::Min,
                };
                organizer.insert(TideEvent::new(time, kind, self.level(set, time)?));
            }

            if let Some(zero) = slack {
                if let Some((time, rising)) = self.find_mark_crossing(previous, found, zero)? {
                    if in_range(time) {
                        let kind = if rising {
                            TideEventType::SlackRise
                        } else {
                            TideEventType::SlackFall
                        };
                        organizer.insert(TideEvent::new(time, kind, zero));
                    }
                }
            }

            if let Some(mark) = mark {
                if let Some((time, rising)) = self.find_mark_crossing(previous, found, mark)? {
                    if in_range(time) {
                        let kind = if rising {
                            TideEventType::MarkRise
                        } else {
                            TideEventType::MarkFall
                        };
                        organizer.insert(TideEvent::new(time, kind, mark));
                    }
                }
            }

            previous = found;
            cursor = found;
        }

        debug!(events = organizer.len(), %start, %end, "predicted events");
        Ok(organizer)
    }

    /// Predicted levels every `step` over `[start, end)`.
    ///
    /// Empty for a station without a usable constituent set.
    pub fn predict_raw_events(
        &self,
        start: Timestamp,
        end: Timestamp,
        step: Interval,
    ) -> Result<TideEventOrganizer> {
        let mut organizer = TideEventOrganizer::new();
        let Some(set) = self.valid_set()? else {
            return Ok(organizer);
        };
        if start >= end || step <= Interval::ZERO {
            organizer.insert(TideEvent::invalid(start));
            return Ok(organizer);
        }

        let mut t = start;
        while t < end {
            organizer.insert(TideEvent::new(
                t,
                TideEventType::RawReading,
                self.level(set, t)?,
            ));
            t += step;
        }
        Ok(organizer)
    }

    /// Grow `organizer` by `range`: backwards from its first event when
    /// negative, forwards from its last event when positive.
    pub fn extend_range(
        &self,
        organizer: &mut TideEventOrganizer,
        range: Interval,
        mark: Option<Amplitude>,
        filter: EventFilter,
    ) -> Result<()> {
        if !self.is_valid()? {
            return Ok(());
        }
        let (start, end) = match (organizer.first(), organizer.last()) {
            (Some(first), _) if range < Interval::ZERO => (first.time + range, first.time),
            (_, Some(last)) if range > Interval::ZERO => {
                (last.time + Interval::from_seconds(1), last.time + range)
            }
            _ => return Ok(()),
        };
        let more = self.predict_events(start, end, mark, filter)?;
        organizer.extend(more);
        Ok(())
    }

    /// Grow `organizer` with readings every `step`, continuing its grid
    /// backwards (negative `range`) or forwards (positive `range`).
    pub fn extend_raw_range(
        &self,
        organizer: &mut TideEventOrganizer,
        range: Interval,
        step: Interval,
    ) -> Result<()> {
        if !self.is_valid()? {
            return Ok(());
        }
        let (start, end) = match (organizer.first(), organizer.last()) {
            (Some(first), _) if range < Interval::ZERO => (first.time + range, first.time),
            (_, Some(last)) if range > Interval::ZERO => {
                (last.time + step, last.time + step + range)
            }
            _ => return Ok(()),
        };
        let more = self.predict_raw_events(start, end, step)?;
        organizer.extend(more);
        Ok(())
    }

    /// Find the next maximum or minimum strictly after `t`.
    ///
    /// Returns `None` when the station has no usable constituent set.
    pub fn next_max_min(&self, t: Timestamp) -> Result<Option<MaxMin>> {
        match self.valid_set()? {
            Some(set) => self.next_extremum(set, t).map(Some),
            None => Ok(None),
        }
    }

    fn next_extremum(&self, set: &dyn ConstituentSet, t: Timestamp) -> Result<MaxMin> {
        let slope =
            |t: Timestamp, k: u32| -> Result<f64> { Ok(set.tide_derivative(t, k + 1)?.value()) };

        let max_f = set.tide_derivative_max(1)?.value();
        let max_fp = set.tide_derivative_max(2)?.value();
        let max_fpp = set.tide_derivative_max(3)?.value();
        let precision = self.precision.as_secs_f64();
        // Rounding leaves a residue of order ε·max|f'| at exact extrema.
        let is_flat = |f: f64| f.abs() <= SLOPE_EPSILON * max_f;

        let mut t_left = t;
        let mut f_left = slope(t_left, 0)?;
        while is_flat(f_left) {
            t_left += self.precision;
            f_left = slope(t_left, 0)?;
        }

        // Look for the slope crossing from negative to positive after scaling.
        let (kind, scale) = if f_left < 0.0 {
            (ExtremumKind::Min, 1.0)
        } else {
            (ExtremumKind::Max, -1.0)
        };
        f_left *= scale;

        loop {
            let df_left = scale * slope(t_left, 1)?;
            let step1 = f_left.abs() / max_fp;
            let step2 = df_left.abs() / max_fpp;
            let step = if df_left < 0.0 { step1 + step2 } else { step1.max(step2) };
            let step = if step.is_finite() { step.max(precision) } else { precision };

            let mut t_right = t_left + seconds_to_interval(step);
            let mut f_right = scale * slope(t_right, 0)?;
            while is_flat(f_right) {
                t_right += self.precision;
                f_right = scale * slope(t_right, 0)?;
            }

            if f_right > 0.0 {
                let time = find_zero(t_left, t_right, self.precision, slope)?;
                return Ok(MaxMin {
                    kind,
                    time,
                    bracket_end: t_right,
                });
            }
            t_left = t_right;
            f_left = f_right;
        }
    }

    /// Crossing of `mark` by the level within `[t1, t2]`, with `true` for
    /// a rising crossing.
    ///
    /// The level must be monotonic on the interval, as it is between
    /// consecutive extrema. A level exactly at the mark at `t1` counts as
    /// a crossing at `t1` when the level leaves the mark by `t2`.
    pub fn find_mark_crossing(
        &self,
        t1: Timestamp,
        t2: Timestamp,
        mark: Amplitude,
    ) -> Result<Option<(Timestamp, bool)>> {
        let Some(set) = self.set else {
            return Ok(None);
        };
        if t1 >= t2 {
            return Ok(None);
        }
        let offset = mark.try_sub(set.datum())?.value();
        let above = |t: Timestamp, k: u32| -> Result<f64> {
            let v = set.tide_derivative(t, k)?.value();
            Ok(if k == 0 { v - offset } else { v })
        };

        let f1 = above(t1, 0)?;
        let f2 = above(t2, 0)?;
        if f1 == 0.0 {
            return Ok((f2 != 0.0).then_some((t1, f2 > 0.0)));
        }
        let rising = if f1 < 0.0 && f2 >= 0.0 {
            true
        } else if f1 > 0.0 && f2 <= 0.0 {
            false
        } else {
            return Ok(None);
        };
        if f2 == 0.0 {
            return Ok(Some((t2, rising)));
        }
        Ok(find_zero(t1, t2, self.precision, above)?.map(|t| (t, rising)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constituents::RunningSet;
    use crate::types::Speed;

    fn semidiurnal(datum: Amplitude, amplitude: Amplitude) -> RunningSet {
        let mut set = RunningSet::new(datum, Timestamp::from_seconds(0));
        set.append(amplitude, Speed::from_degrees_per_hour(30.0).unwrap(), 0.0)
            .unwrap();
        set
    }

    #[test]
    fn test_no_constituents() {
        let station = Station::new(None);
        let t = Timestamp::from_seconds(1000);
        assert_eq!(station.predict_level(t).unwrap(), None);
        assert!(!station.is_valid().unwrap());

        let end = t + Interval::from_days(1);
        let events = station
            .predict_events(t, end, None, EventFilter::NoFilter)
            .unwrap();
        let all = events.to_vec();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].kind, TideEventType::Invalid);
        assert_eq!(all[0].time, end);
    }

    #[test]
    fn test_empty_range() {
        let set = semidiurnal(Amplitude::meters(0.0), Amplitude::meters(1.0));
        let station = Station::new(Some(&set));
        let t = Timestamp::from_seconds(500);
        let all = station
            .predict_events(t, t, None, EventFilter::NoFilter)
            .unwrap()
            .to_vec();
        assert_eq!(all, vec![TideEvent::invalid(t)]);
    }

    #[test]
    fn test_extrema_of_pure_cosine() {
        // Highs at 0, 12 h, 24 h; lows at 6 h, 18 h
        let set = semidiurnal(Amplitude::meters(1.0), Amplitude::meters(0.5));
        let station = Station::new(Some(&set));
        let start = Timestamp::from_seconds(3600);
        let end = Timestamp::from_seconds(3600 * 25);
        let events = station
            .predict_events(start, end, None, EventFilter::MaxMin)
            .unwrap()
            .to_vec();

        let expected = [
            (6, TideEventType::Min),
            (12, TideEventType::Max),
            (18, TideEventType::Min),
            (24, TideEventType::Max),
        ];
        assert_eq!(events.len(), expected.len());
        for (event, (hour, kind)) in events.iter().zip(expected) {
            assert_eq!(event.kind, kind);
            assert!((event.time.seconds() - hour * 3600).abs() <= 15);
            let level = event.level.value();
            let target = if kind == TideEventType::Max { 1.5 } else { 0.5 };
            assert!((level - target).abs() < 1e-5);
        }
    }

    #[test]
    fn test_mark_crossings() {
        let set = semidiurnal(Amplitude::meters(0.0), Amplitude::meters(1.0));
        let station = Station::new(Some(&set));
        let start = Timestamp::from_seconds(0);
        let end = Timestamp::from_seconds(43_200);
        let mark = Amplitude::meters(0.5);
        let events = station
            .predict_events(start, end, Some(mark), EventFilter::NoFilter)
            .unwrap();

        let marks: Vec<&TideEvent> = events
            .iter()
            .filter(|e| matches!(e.kind, TideEventType::MarkRise | TideEventType::MarkFall))
            .collect();
        // cos(ωt) = 0.5 at 2 h (falling) and 10 h (rising)
        assert_eq!(marks.len(), 2);
        assert_eq!(marks[0].kind, TideEventType::MarkFall);
        assert!((marks[0].time.seconds() - 7200).abs() <= 15);
        assert_eq!(marks[1].kind, TideEventType::MarkRise);
        assert!((marks[1].time.seconds() - 36_000).abs() <= 15);

        // Known-tide filter drops mark crossings
        let filtered = station
            .predict_events(start, end, Some(mark), EventFilter::KnownTideEvents)
            .unwrap();
        assert!(filtered.iter().all(|e| e.is_max_min()));
    }

    #[test]
    fn test_mark_dimension_mismatch() {
        let set = semidiurnal(Amplitude::meters(0.0), Amplitude::meters(1.0));
        let station = Station::new(Some(&set));
        let result = station.predict_events(
            Timestamp::from_seconds(0),
            Timestamp::from_seconds(86_400),
            Some(Amplitude::meters_per_second(0.2)),
            EventFilter::NoFilter,
        );
        assert!(matches!(result, Err(TideError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_slack_for_currents() {
        let set = semidiurnal(
            Amplitude::meters_per_second(0.1),
            Amplitude::meters_per_second(1.0),
        );
        let station = Station::new(Some(&set));
        let events = station
            .predict_events(
                Timestamp::from_seconds(0),
                Timestamp::from_seconds(43_200),
                None,
                EventFilter::KnownTideEvents,
            )
            .unwrap();
        let slacks: Vec<&TideEvent> = events
            .iter()
            .filter(|e| matches!(e.kind, TideEventType::SlackRise | TideEventType::SlackFall))
            .collect();
        assert_eq!(slacks.len(), 2);
        assert_eq!(slacks[0].kind, TideEventType::SlackFall);
        assert_eq!(slacks[1].kind, TideEventType::SlackRise);
        for s in &slacks {
            let v = station.predict_level(s.time).unwrap().unwrap().value();
            assert!(v.abs() < 1e-2, "level at slack {}", v);
        }
    }

    #[test]
    fn test_events_ordered_and_in_range() {
        let mut set = RunningSet::new(Amplitude::meters(0.2), Timestamp::from_seconds(0));
        set.append(
            Amplitude::meters(1.0),
            Speed::from_degrees_per_hour(28.9841042).unwrap(),
            0.3,
        )
        .unwrap();
        set.append(
            Amplitude::meters(0.4),
            Speed::from_degrees_per_hour(15.0410686).unwrap(),
            1.7,
        )
        .unwrap();
        let station = Station::new(Some(&set));
        let start = Timestamp::from_seconds(12_345);
        let end = start + Interval::from_days(7);
        let events = station
            .predict_events(start, end, Some(Amplitude::meters(0.1)), EventFilter::NoFilter)
            .unwrap()
            .to_vec();

        assert!(events.len() > 20);
        for pair in events.windows(2) {
            assert!(pair[0].time <= pair[1].time);
        }
        for e in &events {
            assert!(e.time >= start && e.time < end);
        }
        // Extrema alternate
        let kinds: Vec<TideEventType> = events
            .iter()
            .filter(|e| e.is_max_min())
            .map(|e| e.kind)
            .collect();
        for pair in kinds.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
    }

    #[test]
    fn test_raw_events_and_extension() {
        let set = semidiurnal(Amplitude::meters(0.0), Amplitude::meters(1.0));
        let station = Station::new(Some(&set));
        let start = Timestamp::from_seconds(0);
        let mut raw = station
            .predict_raw_events(start, start + Interval::from_hours(3), Interval::from_hours(1))
            .unwrap();
        assert_eq!(raw.len(), 3);
        assert!(raw.iter().all(|e| e.kind == TideEventType::RawReading));

        station
            .extend_raw_range(&mut raw, Interval::from_hours(2), Interval::from_hours(1))
            .unwrap();
        assert_eq!(raw.len(), 5);
        assert_eq!(raw.last().unwrap().time.seconds(), 4 * 3600);

        let mut events = station
            .predict_events(
                Timestamp::from_seconds(3600),
                Timestamp::from_seconds(3600 * 13),
                None,
                EventFilter::MaxMin,
            )
            .unwrap();
        assert_eq!(events.len(), 2);
        station
            .extend_range(&mut events, Interval::from_hours(-12), None, EventFilter::MaxMin)
            .unwrap();
        // Adds the high at 0 h
        assert_eq!(events.len(), 3);
        assert_eq!(events.first().unwrap().kind, TideEventType::Max);
    }

    #[test]
    fn test_extension_without_constituents_is_noop() {
        let station = Station::new(None);
        let mut events = TideEventOrganizer::new();
        events.insert(TideEvent::new(
            Timestamp::from_seconds(100),
            TideEventType::Max,
            Amplitude::meters(1.0),
        ));

        station
            .extend_range(&mut events, Interval::from_hours(12), None, EventFilter::NoFilter)
            .unwrap();
        station
            .extend_raw_range(&mut events, Interval::from_hours(12), Interval::from_hours(1))
            .unwrap();
        station
            .extend_range(&mut events, Interval::from_hours(-12), None, EventFilter::MaxMin)
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events.first().unwrap().kind, TideEventType::Max);

        let start = Timestamp::from_seconds(0);
        let raw = station
            .predict_raw_events(start, start + Interval::from_hours(3), Interval::from_hours(1))
            .unwrap();
        assert!(raw.is_empty());
    }

    #[test]
    fn test_mark_crossing_at_interval_start() {
        let set = semidiurnal(Amplitude::meters(0.0), Amplitude::meters(1.0));
        let station = Station::new(Some(&set));
        let start = Timestamp::from_seconds(2 * 3600);
        // Level equals the mark exactly at `start`, falling
        let mark = station.predict_level(start).unwrap().unwrap();

        let crossing = station
            .find_mark_crossing(start, start + Interval::from_hours(3), mark)
            .unwrap();
        assert_eq!(crossing, Some((start, false)));

        let events = station
            .predict_events(start, start + Interval::from_hours(6), Some(mark), EventFilter::NoFilter)
            .unwrap()
            .to_vec();
        let marks: Vec<&TideEvent> = events
            .iter()
            .filter(|e| matches!(e.kind, TideEventType::MarkRise | TideEventType::MarkFall))
            .collect();
        assert_eq!(marks.len(), 1);
        assert_eq!(marks[0].kind, TideEventType::MarkFall);
        assert_eq!(marks[0].time, start);

        // A level resting on the mark at both ends is no crossing
        let flat = RunningSet::new(Amplitude::meters(0.5), Timestamp::from_seconds(0));
        let flat_station = Station::new(Some(&flat));
        assert_eq!(
            flat_station
                .find_mark_crossing(start, start + Interval::from_hours(1), Amplitude::meters(0.5))
                .unwrap(),
            None
        );
    }
}
