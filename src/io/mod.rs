//! I/O utilities for reading station data files.
//!
//! This module provides:
//! - **Readings files**: observed levels or currents as `time value` text,
//!   split into uniformly stepped runs ready for a [`MemoryStore`]
//!
//! # File Formats
//!
//! ## Readings Files
//!
//! ```text
//! # station: Bergen
//! # unit: m
//! # columns: time value
//! 1704067200 0.45
//! 1704070800 0.61
//! ```
//!
//! # Example
//!
//! ```
//! use tide_harmonics::io::parse_readings;
//! use tide_harmonics::series::StationId;
//! use tide_harmonics::store::MemoryStore;
//!
//! let file = parse_readings("0 1.0\n3600 1.2\n7200 0.9\n").unwrap();
//! let mut store = MemoryStore::new();
//! let epochs = file.load_into(&mut store, StationId(1));
//! assert_eq!(epochs[0].count, 3);
//! ```
//!
//! [`MemoryStore`]: crate::store::MemoryStore

mod readings_reader;

pub use readings_reader::{
    ReadingRun, ReadingsFile, ReadingsFileError, parse_readings, read_readings_file,
};
