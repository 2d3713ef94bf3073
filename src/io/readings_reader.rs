//! Reader for station reading files.
//!
//! Parses two-column text files of observed levels or current speeds and
//! splits them into uniformly stepped runs, one per epoch.
//!
//! # File Format
//!
//! ```text
//! # station: Bergen
//! # unit: m
//! # columns: time value
//! 1704067200 0.45
//! 1704070800 0.61
//! 2024-01-01T02:00:00Z 0.72
//! ```
//!
//! Times are POSIX seconds or RFC 3339 instants and must be strictly
//! increasing. A change of step between consecutive readings starts a new
//! run. The unit is any unit accepted by [`Amplitude`]'s parser (`m`,
//! `m/s`, `m/s^k`); meters are assumed when absent.

use std::fs;
use std::path::Path;

use chrono::DateTime;
use thiserror::Error;
use tracing::debug;

use crate::series::{Epoch, StationId};
use crate::store::MemoryStore;
use crate::types::{Amplitude, Dimension, Interval, Timestamp};

/// Error type for reading file parsing.
#[derive(Debug, Error)]
pub enum ReadingsFileError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Parse error with line number
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Empty file (no data records)
    #[error("Readings file contains no data")]
    EmptyFile,

    /// Non-monotonic time values
    #[error("Non-monotonic time at line {line}")]
    NonMonotonic { line: usize },
}

/// Consecutive readings with one fixed step.
#[derive(Clone, Debug, PartialEq)]
pub struct ReadingRun {
    /// Time of the first reading
    pub start: Timestamp,
    /// Spacing between readings
    pub step: Interval,
    /// Readings in time order
    pub readings: Vec<f64>,
}

impl ReadingRun {
    fn starting(start: Timestamp, reading: f64) -> Self {
        Self {
            start,
            step: Interval::ZERO,
            readings: vec![reading],
        }
    }

    /// Time of the last reading.
    pub fn last(&self) -> Timestamp {
        self.start + self.step * (self.readings.len() as i64 - 1)
    }
}

/// Contents of a readings file.
#[derive(Clone, Debug, PartialEq)]
pub struct ReadingsFile {
    /// Station name from the `station:` header, if any
    pub station: Option<String>,
    /// Physical dimension of the values
    pub dimension: Dimension,
    /// Runs in time order
    pub runs: Vec<ReadingRun>,
}

impl ReadingsFile {
    /// Total number of readings.
    pub fn len(&self) -> usize {
        self.runs.iter().map(|r| r.readings.len()).sum()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Add every run to `store` as an epoch of `station`.
    ///
    /// Returns the inserted epochs.
    pub fn load_into(&self, store: &mut MemoryStore, station: StationId) -> Vec<Epoch> {
        store.set_dimension(station, self.dimension);
        self.runs
            .iter()
            .map(|run| {
                let epoch = Epoch::new(
                    store.next_epoch_id(),
                    run.start,
                    run.step,
                    run.readings.len(),
                );
                store.insert_epoch(station, epoch, run.readings.clone());
                epoch
            })
            .collect()
    }
}

/// Read a readings file.
///
/// # Example
///
/// ```ignore
/// use std::path::Path;
/// use tide_harmonics::io::read_readings_file;
///
/// let file = read_readings_file(Path::new("bergen.txt"))?;
/// println!("{} readings in {} runs", file.len(), file.runs.len());
/// ```
pub fn read_readings_file(path: &Path) -> Result<ReadingsFile, ReadingsFileError> {
    let content = fs::read_to_string(path)?;
    parse_readings(&content)
}

/// Parse readings from a string.
///
/// Same format as file, useful for testing or embedded data.
pub fn parse_readings(content: &str) -> Result<ReadingsFile, ReadingsFileError> {
    let mut station = None;
    let mut dimension = Dimension::LENGTH;
    let mut runs: Vec<ReadingRun> = Vec::new();
    let mut last_time: Option<Timestamp> = None;

    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();
        let line_no = line_num + 1;

        if line.is_empty() {
            continue;
        }

        if line.starts_with('#') {
            let comment = line.trim_start_matches('#').trim();
            if let Some(name) = comment.strip_prefix("station:") {
                station = Some(name.trim().to_string());
            } else if let Some(unit) = comment.strip_prefix("unit:") {
                dimension = format!("1 {}", unit.trim())
                    .parse::<Amplitude>()
                    .map_err(|e| ReadingsFileError::ParseError {
                        line: line_no,
                        message: e.to_string(),
                    })?
                    .dimension();
            }
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 2 {
            return Err(ReadingsFileError::ParseError {
                line: line_no,
                message: "Expected: time value".into(),
            });
        }
        let time = parse_time(parts[0]).ok_or_else(|| ReadingsFileError::ParseError {
            line: line_no,
            message: "Invalid time".into(),
        })?;
        let value: f64 = parts[1].parse().map_err(|_| ReadingsFileError::ParseError {
            line: line_no,
            message: "Invalid value".into(),
        })?;

        if let Some(prev) = last_time {
            if time <= prev {
                return Err(ReadingsFileError::NonMonotonic { line: line_no });
            }
        }
        last_time = Some(time);

        match runs.last_mut() {
            Some(run) if run.readings.len() == 1 => {
                run.step = time - run.start;
                run.readings.push(value);
            }
            Some(run) if time - run.last() == run.step => run.readings.push(value),
            _ => runs.push(ReadingRun::starting(time, value)),
        }
    }

    if runs.is_empty() {
        return Err(ReadingsFileError::EmptyFile);
    }

    // A lone trailing reading inherits the step before it
    let fallback = runs
        .iter()
        .rev()
        .find(|r| r.step > Interval::ZERO)
        .map_or(Interval::from_seconds(1), |r| r.step);
    for run in runs.iter_mut().filter(|r| r.step == Interval::ZERO) {
        run.step = fallback;
    }

    debug!(runs = runs.len(), ?station, "parsed readings");
    Ok(ReadingsFile {
        station,
        dimension,
        runs,
    })
}

fn parse_time(text: &str) -> Option<Timestamp> {
    if let Ok(seconds) = text.parse::<i64>() {
        return Some(Timestamp::from_seconds(seconds));
    }
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| Timestamp::from_seconds(dt.timestamp()))
}
