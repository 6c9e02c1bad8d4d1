//! Authoritative hourly AQI series
//!
//! Upstream air-quality services publish an hourly AQI series for the current
//! local day: parallel arrays of ISO-8601 local timestamps and (nullable) AQI
//! values, where index `i` is hour `i` after local midnight. When such a
//! series covers the forecast window it replaces the heuristic projection.

use super::generator::{ForecastPoint, Provenance};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Timestamp layouts accepted in `time` (with and without seconds)
const TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Display format for hour labels, e.g. `01 PM`
const HOUR_LABEL_FORMAT: &str = "%I %p";

/// Hourly series of authoritative AQI values
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HourlySeries {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub us_aqi: Vec<Option<f64>>,
}

/// Bare `HH:00` label for an hour of day
#[must_use]
pub fn hour_label(hour: u32) -> String {
    format!("{:02}:00", hour % 24)
}

impl HourlySeries {
    #[must_use]
    pub fn new(time: Vec<String>, us_aqi: Vec<Option<f64>>) -> Self {
        Self { time, us_aqi }
    }

    /// Number of usable entries (both arrays must cover the index)
    #[must_use]
    pub fn len(&self) -> usize {
        self.time.len().min(self.us_aqi.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Parsed timestamp at `index`
    #[must_use]
    pub fn timestamp(&self, index: usize) -> Option<NaiveDateTime> {
        let raw = self.time.get(index)?;
        TIME_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
    }

    /// Label for the entry at `index` in the series' own hour convention
    #[must_use]
    pub fn label_for_index(&self, index: usize) -> Option<String> {
        self.timestamp(index)
            .map(|t| t.format(HOUR_LABEL_FORMAT).to_string())
    }

    /// Points for the `limit` hours after `reference_hour`
    ///
    /// Hours with a null value are skipped. Unparseable timestamps fall back
    /// to an `HH:00` label.
    #[must_use]
    pub fn upcoming(&self, reference_hour: u32, limit: u32) -> Vec<ForecastPoint> {
        let start = (reference_hour % 24) as usize + 1;
        let end = (start + limit as usize).min(self.len());

        (start..end)
            .filter_map(|index| {
                let aqi = self.us_aqi[index]?;
                if !aqi.is_finite() {
                    return None;
                }
                let label = self
                    .label_for_index(index)
                    .unwrap_or_else(|| hour_label(index as u32));
                Some(ForecastPoint::new(label, aqi, Provenance::Satellite))
            })
            .collect()
    }
}
