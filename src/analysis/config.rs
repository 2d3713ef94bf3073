//! Tunable cutoffs for harmonic analysis.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;

/// Cutoffs controlling mode selection and solve cost.
///
/// # Example
///
/// ```
/// use tide_harmonics::analysis::AnalysisConfig;
///
/// let mut config = AnalysisConfig::default().with_amplitude_cut(0.01);
/// config.set("resolution_cut", "0.95").unwrap();
/// assert!(config.set("no_such_key", "1").is_err());
/// assert_eq!(config.resolution_cut, 0.95);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Constituents with fitted amplitude below this are discarded.
    pub amplitude_cut: f64,
    /// Maximum |coupling| between a mode and its own mirror (−ω) image.
    pub slow_cut: f64,
    /// Modes coupled more strongly than this are solved together.
    pub resolution_cut: f64,
    /// Lower bound on the relative amplitude difference within a group.
    pub amplitude_diff_lower_cut: f64,
    /// Upper bound on the relative amplitude difference within a group.
    pub amplitude_diff_upper_cut: f64,
    /// Only the most recent samples up to this count are analyzed.
    pub max_sample_size: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            amplitude_cut: 0.005,
            slow_cut: 0.2,
            resolution_cut: 0.9,
            amplitude_diff_lower_cut: 0.01,
            amplitude_diff_upper_cut: 1.0,
            max_sample_size: 500_000,
        }
    }
}

impl AnalysisConfig {
    /// Setting names accepted by [`AnalysisConfig::set`].
    pub const KEYS: [&'static str; 6] = [
        "amplitude_cut",
        "slow_cut",
        "resolution_cut",
        "amplitude_diff_lower_cut",
        "amplitude_diff_upper_cut",
        "max_sample_size",
    ];

    /// Set the amplitude cutoff.
    pub fn with_amplitude_cut(mut self, cut: f64) -> Self {
        self.amplitude_cut = cut;
        self
    }

    /// Set the slow (mirror coupling) cutoff.
    pub fn with_slow_cut(mut self, cut: f64) -> Self {
        self.slow_cut = cut;
        self
    }

    /// Set the resolution cutoff.
    pub fn with_resolution_cut(mut self, cut: f64) -> Self {
        self.resolution_cut = cut;
        self
    }

    /// Set both amplitude difference bounds.
    pub fn with_amplitude_diff_cuts(mut self, lower: f64, upper: f64) -> Self {
        self.amplitude_diff_lower_cut = lower;
        self.amplitude_diff_upper_cut = upper;
        self
    }

    /// Set the sample budget.
    pub fn with_max_sample_size(mut self, samples: usize) -> Self {
        self.max_sample_size = samples;
        self
    }

    /// Set one value by name from text.
    ///
    /// Unknown keys and unparsable values are rejected and leave the
    /// configuration unchanged.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let result = self.try_set(key, value.trim());
        if let Err(err) = &result {
            warn!(key, value, error = %err, "rejected analysis setting");
        }
        result
    }

    fn try_set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };
        let number = || -> Result<f64, ConfigError> {
            value
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && *v >= 0.0)
                .ok_or_else(invalid)
        };
        match key {
            "amplitude_cut" => self.amplitude_cut = number()?,
            "slow_cut" => self.slow_cut = number()?,
            "resolution_cut" => self.resolution_cut = number()?,
            "amplitude_diff_lower_cut" => self.amplitude_diff_lower_cut = number()?,
            "amplitude_diff_upper_cut" => self.amplitude_diff_upper_cut = number()?,
            "max_sample_size" => {
                self.max_sample_size = value.parse::<usize>().map_err(|_| invalid())?
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    /// Current value of a setting as text.
    pub fn get(&self, key: &str) -> Option<String> {
        Some(match key {
            "amplitude_cut" => self.amplitude_cut.to_string(),
            "slow_cut" => self.slow_cut.to_string(),
            "resolution_cut" => self.resolution_cut.to_string(),
            "amplitude_diff_lower_cut" => self.amplitude_diff_lower_cut.to_string(),
            "amplitude_diff_upper_cut" => self.amplitude_diff_upper_cut.to_string(),
            "max_sample_size" => self.max_sample_size.to_string(),
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.amplitude_cut, 0.005);
        assert_eq!(config.slow_cut, 0.2);
        assert_eq!(config.resolution_cut, 0.9);
        assert_eq!(config.amplitude_diff_lower_cut, 0.01);
        assert_eq!(config.amplitude_diff_upper_cut, 1.0);
        assert_eq!(config.max_sample_size, 500_000);
    }

    #[test]
    fn test_set_by_key() {
        let mut config = AnalysisConfig::default();
        config.set("slow_cut", " 0.25 ").unwrap();
        config.set("max_sample_size", "1000").unwrap();
        assert_eq!(config.slow_cut, 0.25);
        assert_eq!(config.max_sample_size, 1000);
        assert_eq!(config.get("slow_cut").as_deref(), Some("0.25"));
        assert_eq!(config.get("bogus"), None);
        for key in AnalysisConfig::KEYS {
            assert!(config.get(key).is_some());
        }
    }

    #[test]
    fn test_rejected_values_keep_previous() {
        let mut config = AnalysisConfig::default();
        assert_eq!(
            config.set("amplitude_cut", "abc"),
            Err(ConfigError::InvalidValue {
                key: "amplitude_cut".into(),
                value: "abc".into()
            })
        );
        assert!(config.set("amplitude_cut", "-1").is_err());
        assert!(config.set("max_sample_size", "1.5").is_err());
        assert_eq!(
            config.set("unknown", "1"),
            Err(ConfigError::UnknownKey("unknown".into()))
        );
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{ "amplitude_cut": 0.02, "max_sample_size": 1000 }"#).unwrap();
        assert_eq!(config.amplitude_cut, 0.02);
        assert_eq!(config.max_sample_size, 1000);
        assert_eq!(config.resolution_cut, 0.9);
    }
}
