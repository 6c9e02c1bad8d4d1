//! Time-of-day pollution trend
//!
//! Traffic-dominated pollutants build up through the morning and evening rush
//! hours and disperse overnight. Ozone moves the other way (NO titration during
//! rush hour), approximated by scaling it with `2 - modifier`.

use crate::config::ForecastConfig;
use crate::core_types::{Pollutant, PollutantReading};

/// Coarse classification of a local hour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeOfDay {
    RushHour,
    Night,
    Daytime,
}

/// Classify a local hour (wrapped into 0..24). Rush hour wins over night if
/// configured windows overlap.
#[must_use]
pub fn classify_hour(hour: u32, config: &ForecastConfig) -> TimeOfDay {
    let hour = hour % 24;
    if config.rush_hour_windows.iter().any(|w| w.contains(hour)) {
        TimeOfDay::RushHour
    } else if config.night_windows.iter().any(|w| w.contains(hour)) {
        TimeOfDay::Night
    } else {
        TimeOfDay::Daytime
    }
}

/// Concentration multiplier for the hour `offset_hours` after `reference_hour`
///
/// - Rush hour: `1 + rush_hour_rate × offset`
/// - Night: `1 - night_rate × offset`
/// - Otherwise: 1
#[must_use]
pub fn trend_modifier(reference_hour: u32, offset_hours: u32, config: &ForecastConfig) -> f64 {
    let future_hour = (reference_hour % 24 + offset_hours % 24) % 24;
    let offset = f64::from(offset_hours);
    match classify_hour(future_hour, config) {
        TimeOfDay::RushHour => 1.0 + config.rush_hour_rate * offset,
        TimeOfDay::Night => 1.0 - config.night_rate * offset,
        TimeOfDay::Daytime => 1.0,
    }
}

/// Apply a trend modifier to a reading
///
/// PM2.5, PM10, NO2 and CO scale with the modifier, O3 with `2 - modifier`,
/// SO2 is left alone.
#[must_use]
pub fn apply_trend(reading: &PollutantReading, modifier: f64) -> PollutantReading {
    let mut scaled = *reading;
    for pollutant in [Pollutant::Pm25, Pollutant::Pm10, Pollutant::No2, Pollutant::Co] {
        scaled.scale(pollutant, modifier);
    }
    scaled.scale(Pollutant::O3, 2.0 - modifier);
    scaled
}
