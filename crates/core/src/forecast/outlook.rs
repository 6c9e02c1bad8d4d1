//! Multi-day outlook
//!
//! A coarse day-ahead view for dashboards: today's AQI perturbed by a bounded
//! random walk, with a sky condition derived from the perturbed value. The
//! caller owns the RNG, so a seeded generator gives reproducible output.

use crate::config::OutlookConfig;
use crate::core_types::RiskLevel;
use chrono::{Days, NaiveDate};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Sky condition shown alongside a daily outlook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkyCondition {
    Sunny,
    Cloudy,
    Rainy,
}

impl SkyCondition {
    /// Condition for an (unrounded) AQI
    #[must_use]
    pub fn from_aqi(aqi: f64) -> Self {
        if aqi < 50.0 {
            SkyCondition::Sunny
        } else if aqi < 100.0 {
            SkyCondition::Cloudy
        } else {
            SkyCondition::Rainy
        }
    }
}

/// Outlook for one future day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyOutlook {
    /// Weekday name, e.g. `Saturday`
    pub day: String,
    pub aqi: u32,
    pub risk: RiskLevel,
    pub condition: SkyCondition,
}

/// Outlook for the `config.days` days after `today`
///
/// Out-of-range settings are clamped to the limits [`EngineConfig::validate`]
/// enforces, so an unvalidated config cannot make the RNG panic.
///
/// [`EngineConfig::validate`]: crate::config::EngineConfig::validate
#[must_use]
pub fn daily_outlook<R: Rng>(
    aqi: f64,
    today: NaiveDate,
    config: &OutlookConfig,
    rng: &mut R,
) -> Vec<DailyOutlook> {
    let base = if aqi.is_finite() { aqi.max(0.0) } else { 0.0 };
    let jitter = if config.jitter.is_finite() {
        config.jitter.abs().min(OutlookConfig::MAX_JITTER)
    } else {
        0.0
    };

    (1..=config.days.min(OutlookConfig::MAX_DAYS))
        .map_while(|offset| {
            let date = today.checked_add_days(Days::new(u64::from(offset)))?;
            let delta = if jitter > 0.0 {
                rng.random_range(-jitter..=jitter)
            } else {
                0.0
            };
            let value = (base + delta).max(0.0);

            Some(DailyOutlook {
                day: date.format("%A").to_string(),
                aqi: value as u32,
                risk: RiskLevel::from_aqi(value),
                condition: SkyCondition::from_aqi(value),
            })
        })
        .collect()
}
