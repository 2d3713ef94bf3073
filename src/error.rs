//! Error types shared across the analysis and prediction pipeline.

use thiserror::Error;

use crate::types::Dimension;

/// Errors raised by the tide engine.
#[derive(Error, Debug)]
pub enum TideError {
    /// Arithmetic or comparison between amplitudes with different units.
    #[error("Dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: Dimension, right: Dimension },

    /// Angular speeds must be non-negative.
    #[error("Negative speed: {0} rad/s")]
    NegativeSpeed(f64),

    /// No node factor / equilibrium argument for the requested year,
    /// or the per-year tables are inconsistent.
    #[error("Unsupported constituent correction: {0}")]
    UnsupportedCorrection(String),

    /// A timestamp or year outside the calendar range.
    #[error("Timestamp out of range: {0}")]
    TimestampOutOfRange(String),

    /// Reading source or coefficient store failure.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Rejected analysis configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl TideError {
    /// Create a dimension mismatch error.
    pub fn dimension_mismatch(left: Dimension, right: Dimension) -> Self {
        Self::DimensionMismatch { left, right }
    }

    /// Create an unsupported correction error.
    pub fn unsupported_correction(message: impl Into<String>) -> Self {
        Self::UnsupportedCorrection(message.into())
    }
}

/// Failures reported by a reading source or a coefficient store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Unknown station.
    #[error("Unknown station: {0}")]
    UnknownStation(u32),

    /// Unknown epoch.
    #[error("Unknown epoch: {0}")]
    UnknownEpoch(u32),

    /// Backend failure.
    #[error("Backend failure: {0}")]
    Backend(String),
}

/// Rejected configuration key or value.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    /// Key does not name any setting.
    #[error("Unknown key: {0}")]
    UnknownKey(String),

    /// Value could not be parsed as a number for the key.
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Result alias for tide engine operations.
pub type Result<T> = std::result::Result<T, TideError>;
