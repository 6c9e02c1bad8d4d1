//! Pollutant vocabulary and the per-request concentration record
//!
//! A reading is a fixed record of six optional fields, one per pollutant, each
//! carrying its own unit. Upstream feeds use several spellings for the same
//! pollutant (`NO2`, `NO₂`, `nitrogen_dioxide`), so all of them are accepted
//! when parsing, but an unknown key is an error rather than a silent zero.

use super::units::{MicrogramsPerCubicMeter, MilligramsPerCubicMeter};
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// The six pollutants the engine understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Pollutant {
    /// Fine particulate matter (µg/m³)
    #[serde(rename = "PM2.5")]
    Pm25,
    /// Coarse particulate matter (µg/m³)
    #[serde(rename = "PM10")]
    Pm10,
    /// Nitrogen dioxide (µg/m³)
    #[serde(rename = "NO2")]
    No2,
    /// Sulphur dioxide (µg/m³)
    #[serde(rename = "SO2")]
    So2,
    /// Carbon monoxide (mg/m³)
    #[serde(rename = "CO")]
    Co,
    /// Ozone (µg/m³)
    #[serde(rename = "O3")]
    O3,
}

impl Pollutant {
    /// All pollutants in canonical order
    pub const ALL: [Pollutant; 6] = [
        Pollutant::Pm25,
        Pollutant::Pm10,
        Pollutant::No2,
        Pollutant::So2,
        Pollutant::Co,
        Pollutant::O3,
    ];

    /// Canonical symbol
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Pm25 => "PM2.5",
            Self::Pm10 => "PM10",
            Self::No2 => "NO2",
            Self::So2 => "SO2",
            Self::Co => "CO",
            Self::O3 => "O3",
        }
    }

    /// Unit the reading stores this pollutant in
    #[must_use]
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Co => "mg/m³",
            _ => "µg/m³",
        }
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Error returned when a key does not name a known pollutant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown pollutant key '{0}'")]
pub struct PollutantParseError(pub String);

impl FromStr for Pollutant {
    type Err = PollutantParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Fold unicode subscripts so "NO₂" and "O₃" match their ASCII forms
        let folded: String = s
            .trim()
            .chars()
            .map(|c| match c {
                '₀'..='₉' => char::from_u32(u32::from(c) - 0x2080 + u32::from('0')).unwrap_or(c),
                _ => c.to_ascii_lowercase(),
            })
            .filter(|c| !matches!(c, ' ' | '-'))
            .collect();

        match folded.as_str() {
            "pm2.5" | "pm2_5" | "pm25" => Ok(Self::Pm25),
            "pm10" => Ok(Self::Pm10),
            "no2" | "nitrogen_dioxide" => Ok(Self::No2),
            "so2" | "sulphur_dioxide" | "sulfur_dioxide" => Ok(Self::So2),
            "co" | "carbon_monoxide" => Ok(Self::Co),
            "o3" | "ozone" => Ok(Self::O3),
            _ => Err(PollutantParseError(s.to_string())),
        }
    }
}

/// Pollutant concentrations for one location at one instant
///
/// Absent fields mean "not reported". Consumers decide whether an absent
/// pollutant counts as zero (attribution) or is skipped (AQI calculation).
///
/// Serializes with canonical symbols as keys. Deserialization resolves every
/// key through [`Pollutant::from_str`], so any accepted spelling works, an
/// unknown key fails, and a `null` value leaves the pollutant absent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PollutantReading {
    #[serde(rename = "PM2.5", skip_serializing_if = "Option::is_none")]
    pub pm2_5: Option<MicrogramsPerCubicMeter>,
    #[serde(rename = "PM10", skip_serializing_if = "Option::is_none")]
    pub pm10: Option<MicrogramsPerCubicMeter>,
    #[serde(rename = "NO2", skip_serializing_if = "Option::is_none")]
    pub no2: Option<MicrogramsPerCubicMeter>,
    #[serde(rename = "SO2", skip_serializing_if = "Option::is_none")]
    pub so2: Option<MicrogramsPerCubicMeter>,
    #[serde(rename = "CO", skip_serializing_if = "Option::is_none")]
    pub co: Option<MilligramsPerCubicMeter>,
    #[serde(rename = "O3", skip_serializing_if = "Option::is_none")]
    pub o3: Option<MicrogramsPerCubicMeter>,
}

struct ReadingVisitor;

impl<'de> Visitor<'de> for ReadingVisitor {
    type Value = PollutantReading;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of pollutant keys to concentrations")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut reading = PollutantReading::new();
        let mut seen = Vec::with_capacity(Pollutant::ALL.len());

        while let Some(key) = map.next_key::<String>()? {
            let pollutant: Pollutant = key.parse().map_err(de::Error::custom)?;
            // Two spellings of one pollutant in the same object
            if seen.contains(&pollutant) {
                return Err(de::Error::duplicate_field(pollutant.symbol()));
            }
            seen.push(pollutant);

            if let Some(value) = map.next_value::<Option<f64>>()? {
                reading.set(pollutant, value);
            }
        }
        Ok(reading)
    }
}

impl<'de> Deserialize<'de> for PollutantReading {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(ReadingVisitor)
    }
}

impl PollutantReading {
    /// Fallback concentrations used when a trained model needs a complete
    /// feature vector. PM10 defaults to 1.5x the (possibly defaulted) PM2.5.
    pub const MODEL_DEFAULT_PM25: f64 = 30.0;
    pub const MODEL_DEFAULT_PM10_RATIO: f64 = 1.5;
    pub const MODEL_DEFAULT_NO2: f64 = 20.0;
    pub const MODEL_DEFAULT_SO2: f64 = 10.0;
    pub const MODEL_DEFAULT_CO: f64 = 0.5;
    pub const MODEL_DEFAULT_O3: f64 = 30.0;

    /// Empty reading (no pollutant reported)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter. The value is in the pollutant's own unit.
    #[must_use]
    pub fn with(mut self, pollutant: Pollutant, value: f64) -> Self {
        self.set(pollutant, value);
        self
    }

    /// Build a reading from `(key, value)` pairs such as a JSON object
    ///
    /// # Errors
    /// Returns [`PollutantParseError`] for the first key that does not name a
    /// known pollutant.
    pub fn from_named<'a, I>(pairs: I) -> Result<Self, PollutantParseError>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        pairs.into_iter().try_fold(Self::new(), |reading, (key, value)| {
            let pollutant: Pollutant = key.parse()?;
            Ok(reading.with(pollutant, value))
        })
    }

    /// Raw value in the pollutant's own unit, if reported
    #[must_use]
    pub fn get(&self, pollutant: Pollutant) -> Option<f64> {
        match pollutant {
            Pollutant::Pm25 => self.pm2_5.map(f64::from),
            Pollutant::Pm10 => self.pm10.map(f64::from),
            Pollutant::No2 => self.no2.map(f64::from),
            Pollutant::So2 => self.so2.map(f64::from),
            Pollutant::Co => self.co.map(f64::from),
            Pollutant::O3 => self.o3.map(f64::from),
        }
    }

    /// Raw value, treating an absent pollutant as zero
    #[must_use]
    pub fn value_or_zero(&self, pollutant: Pollutant) -> f64 {
        self.get(pollutant).unwrap_or(0.0)
    }

    /// Set a value in the pollutant's own unit (negative input is clamped to 0)
    pub fn set(&mut self, pollutant: Pollutant, value: f64) {
        match pollutant {
            Pollutant::Pm25 => self.pm2_5 = Some(MicrogramsPerCubicMeter::new(value)),
            Pollutant::Pm10 => self.pm10 = Some(MicrogramsPerCubicMeter::new(value)),
            Pollutant::No2 => self.no2 = Some(MicrogramsPerCubicMeter::new(value)),
            Pollutant::So2 => self.so2 = Some(MicrogramsPerCubicMeter::new(value)),
            Pollutant::Co => self.co = Some(MilligramsPerCubicMeter::new(value)),
            Pollutant::O3 => self.o3 = Some(MicrogramsPerCubicMeter::new(value)),
        }
    }

    /// Multiply a reported pollutant by `factor`. Absent pollutants stay absent.
    pub fn scale(&mut self, pollutant: Pollutant, factor: f64) {
        if let Some(value) = self.get(pollutant) {
            self.set(pollutant, value * factor);
        }
    }

    /// True when no pollutant is reported
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.present().next().is_none()
    }

    /// Iterate over reported pollutants and their raw values
    pub fn present(&self) -> impl Iterator<Item = (Pollutant, f64)> + '_ {
        Pollutant::ALL
            .into_iter()
            .filter_map(move |p| self.get(p).map(|v| (p, v)))
    }

    /// Fill every missing pollutant with its model default
    #[must_use]
    pub fn with_model_defaults(&self) -> Self {
        let pm2_5 = self.get(Pollutant::Pm25).unwrap_or(Self::MODEL_DEFAULT_PM25);
        let pm10 = self
            .get(Pollutant::Pm10)
            .unwrap_or(pm2_5 * Self::MODEL_DEFAULT_PM10_RATIO);

        Self::new()
            .with(Pollutant::Pm25, pm2_5)
            .with(Pollutant::Pm10, pm10)
            .with(Pollutant::No2, self.get(Pollutant::No2).unwrap_or(Self::MODEL_DEFAULT_NO2))
            .with(Pollutant::So2, self.get(Pollutant::So2).unwrap_or(Self::MODEL_DEFAULT_SO2))
            .with(Pollutant::Co, self.get(Pollutant::Co).unwrap_or(Self::MODEL_DEFAULT_CO))
            .with(Pollutant::O3, self.get(Pollutant::O3).unwrap_or(Self::MODEL_DEFAULT_O3))
    }
}
