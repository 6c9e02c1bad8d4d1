//! Semantic unit types for pollutant concentrations
//!
//! Newtype wrappers keep particulate/gas readings (µg/m³), carbon monoxide
//! (mg/m³) and the mixing ratios used by the EPA tables (ppb) from being mixed
//! up by accident.
//!
//! # Design Philosophy
//! - All types wrap `f64` (the engine works in IEEE-754 doubles throughout)
//! - Constructors sanitize: negative or non-finite input becomes 0.0, so every
//!   value held by these types is finite and non-negative
//! - Total ordering via `Ord` (backed by `f64::total_cmp`)
//! - Serde goes through `f64` so deserialized values are sanitized too
//!
//! # Usage
//! ```
//! use airzen_core::core_types::units::{MicrogramsPerCubicMeter, MilligramsPerCubicMeter};
//!
//! let ozone = MicrogramsPerCubicMeter::new(120.0);
//! assert_eq!(*ozone.to_ppb(2.0), 60.0);
//!
//! let co = MicrogramsPerCubicMeter::new(450.0).to_milligrams();
//! assert_eq!(co, MilligramsPerCubicMeter::new(0.45));
//!
//! // Negative sensor glitches are clamped
//! assert_eq!(*MicrogramsPerCubicMeter::new(-3.0), 0.0);
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Deref, Mul};

/// Clamp a raw concentration into the valid domain (finite, >= 0)
#[inline]
fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

// ============================================================================
// MASS CONCENTRATION TYPES
// ============================================================================

/// Mass concentration in micrograms per cubic meter (PM2.5, PM10, NO2, SO2, O3)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
#[repr(transparent)]
pub struct MicrogramsPerCubicMeter(f64);

impl Eq for MicrogramsPerCubicMeter {}

impl PartialOrd for MicrogramsPerCubicMeter {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MicrogramsPerCubicMeter {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Deref for MicrogramsPerCubicMeter {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl MicrogramsPerCubicMeter {
    /// Zero concentration
    pub const ZERO: MicrogramsPerCubicMeter = MicrogramsPerCubicMeter(0.0);

    /// Create a new concentration. Negative or non-finite input is clamped to 0.
    #[inline]
    #[must_use]
    pub fn new(value: f64) -> Self {
        MicrogramsPerCubicMeter(sanitize(value))
    }

    /// Get the raw f64 value
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Convert to a mixing ratio using a fixed µg/m³-per-ppb factor
    ///
    /// The factor is a 25 °C / 1 atm approximation, not temperature or
    /// pressure corrected.
    #[inline]
    #[must_use]
    pub fn to_ppb(self, ug_per_ppb: f64) -> PartsPerBillion {
        PartsPerBillion::new(self.0 / ug_per_ppb)
    }

    /// Convert to milligrams per cubic meter
    #[inline]
    #[must_use]
    pub fn to_milligrams(self) -> MilligramsPerCubicMeter {
        MilligramsPerCubicMeter::new(self.0 / 1000.0)
    }
}

impl From<f64> for MicrogramsPerCubicMeter {
    fn from(v: f64) -> Self {
        MicrogramsPerCubicMeter::new(v)
    }
}

impl From<MicrogramsPerCubicMeter> for f64 {
    fn from(c: MicrogramsPerCubicMeter) -> f64 {
        c.0
    }
}

impl Mul<f64> for MicrogramsPerCubicMeter {
    type Output = MicrogramsPerCubicMeter;
    fn mul(self, rhs: f64) -> MicrogramsPerCubicMeter {
        MicrogramsPerCubicMeter::new(self.0 * rhs)
    }
}

impl fmt::Display for MicrogramsPerCubicMeter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} µg/m³", self.0)
    }
}

/// Mass concentration in milligrams per cubic meter (CO)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
#[repr(transparent)]
pub struct MilligramsPerCubicMeter(f64);

impl Eq for MilligramsPerCubicMeter {}

impl PartialOrd for MilligramsPerCubicMeter {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MilligramsPerCubicMeter {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Deref for MilligramsPerCubicMeter {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl MilligramsPerCubicMeter {
    /// Zero concentration
    pub const ZERO: MilligramsPerCubicMeter = MilligramsPerCubicMeter(0.0);

    /// Create a new concentration. Negative or non-finite input is clamped to 0.
    #[inline]
    #[must_use]
    pub fn new(value: f64) -> Self {
        MilligramsPerCubicMeter(sanitize(value))
    }

    /// Get the raw f64 value
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Convert to micrograms per cubic meter
    #[inline]
    #[must_use]
    pub fn to_micrograms(self) -> MicrogramsPerCubicMeter {
        MicrogramsPerCubicMeter::new(self.0 * 1000.0)
    }
}

impl From<f64> for MilligramsPerCubicMeter {
    fn from(v: f64) -> Self {
        MilligramsPerCubicMeter::new(v)
    }
}

impl From<MilligramsPerCubicMeter> for f64 {
    fn from(c: MilligramsPerCubicMeter) -> f64 {
        c.0
    }
}

impl From<MicrogramsPerCubicMeter> for MilligramsPerCubicMeter {
    fn from(c: MicrogramsPerCubicMeter) -> MilligramsPerCubicMeter {
        c.to_milligrams()
    }
}

impl Mul<f64> for MilligramsPerCubicMeter {
    type Output = MilligramsPerCubicMeter;
    fn mul(self, rhs: f64) -> MilligramsPerCubicMeter {
        MilligramsPerCubicMeter::new(self.0 * rhs)
    }
}

impl fmt::Display for MilligramsPerCubicMeter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} mg/m³", self.0)
    }
}

// ============================================================================
// MIXING RATIO TYPES
// ============================================================================

/// Volumetric mixing ratio in parts per billion (O3, NO2, SO2 breakpoint units)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
#[repr(transparent)]
pub struct PartsPerBillion(f64);

impl Eq for PartsPerBillion {}

impl PartialOrd for PartsPerBillion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PartsPerBillion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Deref for PartsPerBillion {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl PartsPerBillion {
    /// Create a new mixing ratio. Negative or non-finite input is clamped to 0.
    #[inline]
    #[must_use]
    pub fn new(value: f64) -> Self {
        PartsPerBillion(sanitize(value))
    }

    /// Get the raw f64 value
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for PartsPerBillion {
    fn from(v: f64) -> Self {
        PartsPerBillion::new(v)
    }
}

impl From<PartsPerBillion> for f64 {
    fn from(c: PartsPerBillion) -> f64 {
        c.0
    }
}

impl fmt::Display for PartsPerBillion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} ppb", self.0)
    }
}
