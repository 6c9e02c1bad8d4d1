//! Live air-quality payload adaptation
//!
//! The HTTP client lives outside this crate. Whatever fetches the upstream
//! air-quality document hands the decoded JSON to [`LiveResponse`], which
//! turns it into the engine's own inputs: a [`PollutantReading`], the
//! authoritative current AQI and the hourly AQI series.

use crate::core_types::{Pollutant, PollutantReading};
use crate::forecast::HourlySeries;
use chrono::{DateTime, NaiveDateTime, TimeDelta, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Errors that can occur while adapting a live payload
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// Payload is not valid JSON for the expected shape
    #[error("failed to parse live payload: {0}")]
    Parse(#[from] serde_json::Error),
    /// Payload has no `current` block
    #[error("no current data in live payload")]
    MissingCurrent,
}

/// Upstream `current` block. Gas concentrations are in µg/m³, CO included.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveConditions {
    pub us_aqi: Option<f64>,
    pub pm2_5: Option<f64>,
    pub pm10: Option<f64>,
    pub carbon_monoxide: Option<f64>,
    pub nitrogen_dioxide: Option<f64>,
    pub sulphur_dioxide: Option<f64>,
    pub ozone: Option<f64>,
}

/// Rounds half to even, matching the rounding used everywhere else in the engine
fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round_ties_even() / scale
}

impl LiveConditions {
    /// Reading in engine units: one decimal for µg/m³ values, CO in mg/m³
    /// with two decimals. Non-finite upstream values are dropped.
    #[must_use]
    pub fn reading(&self) -> PollutantReading {
        let micrograms = [
            (Pollutant::Pm25, self.pm2_5),
            (Pollutant::Pm10, self.pm10),
            (Pollutant::No2, self.nitrogen_dioxide),
            (Pollutant::O3, self.ozone),
            (Pollutant::So2, self.sulphur_dioxide),
        ];

        let mut reading = micrograms
            .into_iter()
            .filter_map(|(p, v)| v.filter(|v| v.is_finite()).map(|v| (p, v)))
            .fold(PollutantReading::new(), |r, (p, v)| r.with(p, round_to(v, 1)));

        if let Some(co) = self.carbon_monoxide.filter(|v| v.is_finite()) {
            reading.set(Pollutant::Co, round_to(co / 1000.0, 2));
        }
        reading
    }

    /// Upstream US AQI, when reported
    #[must_use]
    pub fn authoritative_aqi(&self) -> Option<f64> {
        self.us_aqi.filter(|v| v.is_finite() && *v >= 0.0)
    }
}

/// Decoded upstream air-quality document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LiveResponse {
    #[serde(default)]
    pub current: Option<LiveConditions>,
    #[serde(default)]
    pub hourly: Option<HourlySeries>,
    #[serde(default)]
    pub utc_offset_seconds: i64,
}

impl LiveResponse {
    /// Parse an upstream JSON document
    ///
    /// # Errors
    /// Returns [`FeedError::Parse`] if the document does not match the expected shape
    pub fn from_json_str(json: &str) -> Result<Self, FeedError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The `current` block
    ///
    /// # Errors
    /// Returns [`FeedError::MissingCurrent`] when the payload carries none
    pub fn conditions(&self) -> Result<&LiveConditions, FeedError> {
        self.current.as_ref().ok_or(FeedError::MissingCurrent)
    }

    /// Hourly series, when present and non-empty
    #[must_use]
    pub fn series(&self) -> Option<&HourlySeries> {
        self.hourly.as_ref().filter(|s| !s.is_empty())
    }

    /// Wall-clock time at the payload's location. An offset chrono cannot
    /// represent is ignored.
    #[must_use]
    pub fn local_time(&self, now: DateTime<Utc>) -> NaiveDateTime {
        let utc = now.naive_utc();
        TimeDelta::try_seconds(self.utc_offset_seconds)
            .and_then(|offset| utc.checked_add_signed(offset))
            .unwrap_or(utc)
    }

    /// Hour of day at the payload's location, as used for forecasting
    #[must_use]
    pub fn reference_hour(&self, now: DateTime<Utc>) -> u32 {
        self.local_time(now).hour()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const PAYLOAD: &str = r#"{
        "utc_offset_seconds": 19800,
        "current": {
            "us_aqi": 87,
            "pm2_5": 27.46,
            "pm10": 41.04,
            "carbon_monoxide": 412.0,
            "nitrogen_dioxide": 18.25,
            "sulphur_dioxide": 6.0,
            "ozone": 71.3
        },
        "hourly": {
            "time": ["2025-03-14T00:00", "2025-03-14T01:00"],
            "us_aqi": [80, 82]
        }
    }"#;

    #[test]
    fn test_reading_rounding_and_units() {
        let response = LiveResponse::from_json_str(PAYLOAD).unwrap();
        let conditions = response.conditions().unwrap();
        let reading = conditions.reading();

        assert_eq!(reading.get(Pollutant::Pm25), Some(27.5));
        assert_eq!(reading.get(Pollutant::Pm10), Some(41.0));
        // 18.25 is a tie and goes to the even neighbour
        assert_eq!(reading.get(Pollutant::No2), Some(18.2));
        assert_eq!(reading.get(Pollutant::Co), Some(0.41));
        assert_eq!(conditions.authoritative_aqi(), Some(87.0));
    }

    #[test]
    fn test_round_to_ties_go_even() {
        assert_eq!(round_to(18.25, 1), 18.2);
        assert_eq!(round_to(18.75, 1), 18.8);
        assert_eq!(round_to(0.125, 2), 0.12);
        assert_eq!(round_to(27.46, 1), 27.5);
    }

    #[test]
    fn test_partial_current_block() {
        let response = LiveResponse::from_json_str(r#"{"current": {"pm10": 12.0}}"#).unwrap();
        let reading = response.conditions().unwrap().reading();
        assert_eq!(reading.present().count(), 1);
        assert_eq!(response.conditions().unwrap().authoritative_aqi(), None);
        assert!(response.series().is_none());
    }

    #[test]
    fn test_missing_current_is_an_error() {
        let response = LiveResponse::from_json_str(r#"{"hourly": {"time": [], "us_aqi": []}}"#).unwrap();
        assert!(matches!(response.conditions(), Err(FeedError::MissingCurrent)));
        assert!(response.series().is_none());
    }

    #[test]
    fn test_reference_hour_uses_local_offset() {
        let response = LiveResponse::from_json_str(PAYLOAD).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 3, 14, 20, 45, 0).unwrap();
        // UTC+5:30
        assert_eq!(response.reference_hour(now), 2);
        assert_eq!(response.series().map(HourlySeries::len), Some(2));
    }
}
