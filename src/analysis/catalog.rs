//! Catalog of candidate constituents ("modes") for harmonic analysis.
//!
//! Speeds are given in degrees per hour. The standard catalog covers the
//! long-period, diurnal, semidiurnal and common shallow-water constituents.
//!
//! # Supported Constituents
//!
//! ## Long period
//! - SA, SSA: solar annual and semiannual
//! - MM, MSF, MF: lunar monthly and fortnightly
//!
//! ## Diurnal (period ~24 hours)
//! - K1: Luni-solar diurnal (23.93 h)
//! - O1: Principal lunar diurnal (25.82 h)
//! - P1: Principal solar diurnal (24.07 h)
//! - Q1, 2Q1, RHO, M1, S1, J1, OO1
//!
//! ## Semidiurnal (period ~12 hours)
//! - M2: Principal lunar (12.42 h) - dominant in most locations
//! - S2: Principal solar (12.00 h)
//! - N2: Larger lunar elliptic (12.66 h)
//! - K2: Luni-solar semidiurnal (11.97 h)
//! - 2N2, MU2, NU2, LAM2, L2, T2, R2, 2SM2
//!
//! ## Shallow water
//! - M3, MK3, MN4, M4, MS4, S4, M6, S6, M8

use std::f64::consts::PI;

use tracing::debug;

use crate::types::Speed;

/// Name of the zero-frequency datum mode.
pub const DATUM_MODE: &str = "Z0";

/// Standard constituents as (name, degrees per hour).
const STANDARD_MODES: &[(&str, f64)] = &[
    ("Z0", 0.0),
    ("SA", 0.0410686),
    ("SSA", 0.0821373),
    ("MM", 0.5443747),
    ("MSF", 1.0158958),
    ("MF", 1.0980331),
    ("2Q1", 12.8542862),
    ("Q1", 13.3986609),
    ("RHO", 13.4715145),
    ("O1", 13.9430356),
    ("M1", 14.4966939),
    ("P1", 14.9589314),
    ("S1", 15.0),
    ("K1", 15.0410686),
    ("J1", 15.5854433),
    ("OO1", 16.1391017),
    ("2N2", 27.8953548),
    ("MU2", 27.9682084),
    ("N2", 28.4397295),
    ("NU2", 28.5125831),
    ("M2", 28.9841042),
    ("LAM2", 29.4556253),
    ("L2", 29.5284789),
    ("T2", 29.9589333),
    ("S2", 30.0),
    ("R2", 30.0410667),
    ("K2", 30.0821373),
    ("2SM2", 31.0158958),
    ("M3", 43.4761563),
    ("MK3", 44.0251729),
    ("MN4", 57.4238337),
    ("M4", 57.9682084),
    ("MS4", 58.9841042),
    ("S4", 60.0),
    ("M6", 86.9523127),
    ("S6", 90.0),
    ("M8", 115.9364166),
];

/// A named candidate constituent.
#[derive(Clone, Debug, PartialEq)]
pub struct Mode {
    /// Constituent name (e.g., "M2")
    pub name: String,
    /// Angular speed
    pub speed: Speed,
}

impl Mode {
    /// Create a mode.
    pub fn new(name: impl Into<String>, speed: Speed) -> Self {
        Self {
            name: name.into(),
            speed,
        }
    }

    /// The datum mode.
    pub fn datum() -> Self {
        Self::new(DATUM_MODE, Speed::ZERO)
    }

    /// True for the zero-frequency datum.
    pub fn is_datum(&self) -> bool {
        self.speed.is_zero()
    }
}

/// Immutable, de-duplicated list of modes in ascending speed order.
///
/// The datum mode Z0 is always present and always first.
///
/// # Example
///
/// ```
/// use tide_harmonics::analysis::ModeCatalog;
///
/// let catalog = ModeCatalog::standard().subset(&["M2", "S2", "K1"]);
/// assert_eq!(catalog.len(), 4); // Z0 is always kept
/// assert_eq!(catalog.modes()[1].name, "K1");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ModeCatalog {
    modes: Vec<Mode>,
}

impl ModeCatalog {
    /// Build a catalog, dropping modes whose speed duplicates an earlier one.
    pub fn new(modes: impl IntoIterator<Item = Mode>) -> Self {
        let mut unique: Vec<Mode> = vec![Mode::datum()];
        for mode in modes {
            if let Some(existing) = unique.iter().find(|m| m.speed == mode.speed) {
                if !mode.is_datum() {
                    debug!(
                        mode = %mode.name,
                        existing = %existing.name,
                        "dropping duplicate mode"
                    );
                }
                continue;
            }
            unique.push(mode);
        }
        unique.sort_by(|a, b| {
            a.speed
                .radians_per_second()
                .total_cmp(&b.speed.radians_per_second())
        });
        Self { modes: unique }
    }

    /// The standard catalog.
    pub fn standard() -> Self {
        Self::new(STANDARD_MODES.iter().map(|&(name, degrees_per_hour)| {
            Mode::new(name, Speed::new_unchecked(degrees_per_hour * PI / 648_000.0))
        }))
    }

    /// Modes of this catalog whose names are listed (plus Z0).
    pub fn subset(&self, names: &[&str]) -> Self {
        Self::new(
            self.modes
                .iter()
                .filter(|m| names.iter().any(|n| n.eq_ignore_ascii_case(&m.name)))
                .cloned(),
        )
    }

    /// All modes, datum first.
    pub fn modes(&self) -> &[Mode] {
        &self.modes
    }

    /// Modes other than the datum.
    pub fn harmonics(&self) -> &[Mode] {
        &self.modes[1..]
    }

    /// Look up a mode by name.
    pub fn get(&self, name: &str) -> Option<&Mode> {
        self.modes.iter().find(|m| m.name.eq_ignore_ascii_case(name))
    }

    /// Look up a mode by speed.
    pub fn find_speed(&self, speed: Speed) -> Option<&Mode> {
        self.modes.iter().find(|m| m.speed == speed)
    }

    /// Number of modes including the datum.
    pub fn len(&self) -> usize {
        self.modes.len()
    }

    /// Always false: the datum is always present.
    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }
}

impl Default for ModeCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
