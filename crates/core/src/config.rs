//! Engine configuration
//!
//! Every tunable of the heuristic models lives here. `Default` reproduces the
//! reference constants, so a config file only needs the fields it overrides.
//!
//! ```
//! use airzen_core::config::EngineConfig;
//!
//! let config = EngineConfig::from_json_str(r#"{"forecast": {"horizon_hours": 2}}"#).unwrap();
//! assert_eq!(config.forecast.horizon_hours, 2);
//! assert_eq!(config.forecast.rush_hour_rate, 0.05);
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Errors that can occur while loading a configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the file
    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),
    /// Failed to parse the file contents
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    /// Values parsed but are inconsistent
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Inclusive range of local hours, e.g. 7..=10
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourWindow {
    pub start: u32,
    pub end: u32,
}

impl HourWindow {
    #[must_use]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn contains(&self, hour: u32) -> bool {
        (self.start..=self.end).contains(&hour)
    }
}

/// Source attribution settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributionConfig {
    /// Below this summed signature score the clean-air default is reported
    pub min_total_score: f64,
}

impl Default for AttributionConfig {
    fn default() -> Self {
        Self {
            min_total_score: 1.0,
        }
    }
}

/// Short-horizon forecast settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Number of hourly steps to project (1-3)
    pub horizon_hours: u32,
    /// Windows where pollution is expected to rise
    pub rush_hour_windows: Vec<HourWindow>,
    /// Windows where pollution is expected to fall
    pub night_windows: Vec<HourWindow>,
    /// Per-hour growth of the modifier inside rush hour
    pub rush_hour_rate: f64,
    /// Per-hour decay of the modifier at night
    pub night_rate: f64,
}

impl ForecastConfig {
    /// Longest horizon the generator supports
    pub const MAX_HORIZON_HOURS: u32 = 3;
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon_hours: Self::MAX_HORIZON_HOURS,
            rush_hour_windows: vec![HourWindow::new(7, 10), HourWindow::new(17, 20)],
            night_windows: vec![HourWindow::new(0, 5)],
            rush_hour_rate: 0.05,
            night_rate: 0.03,
        }
    }
}

/// Multi-day outlook settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlookConfig {
    /// Number of days after today
    pub days: u32,
    /// Maximum absolute random deviation from today's AQI
    pub jitter: f64,
}

impl OutlookConfig {
    /// Longest outlook, in days
    pub const MAX_DAYS: u32 = 14;
    /// Largest accepted jitter, in AQI points
    pub const MAX_JITTER: f64 = 500.0;
}

impl Default for OutlookConfig {
    fn default() -> Self {
        Self {
            days: 3,
            jitter: 50.0,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub attribution: AttributionConfig,
    pub forecast: ForecastConfig,
    pub outlook: OutlookConfig,
}

impl EngineConfig {
    /// Parse and validate a JSON configuration
    ///
    /// # Errors
    /// Returns error if the JSON is malformed or fails [`EngineConfig::validate`]
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    ///
    /// # Errors
    /// Returns error if the file cannot be read, parsed or validated
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Check cross-field constraints
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] describing the first violated constraint
    pub fn validate(&self) -> Result<(), ConfigError> {
        let forecast = &self.forecast;

        if !(1..=ForecastConfig::MAX_HORIZON_HOURS).contains(&forecast.horizon_hours) {
            return Err(ConfigError::Invalid(format!(
                "forecast.horizon_hours must be in 1..={}, got {}",
                ForecastConfig::MAX_HORIZON_HOURS,
                forecast.horizon_hours
            )));
        }

        let windows = forecast
            .rush_hour_windows
            .iter()
            .chain(&forecast.night_windows);
        for window in windows {
            if window.start > window.end || window.end > 23 {
                return Err(ConfigError::Invalid(format!(
                    "hour window {}..={} must satisfy start <= end <= 23",
                    window.start, window.end
                )));
            }
        }

        for (name, rate) in [
            ("forecast.rush_hour_rate", forecast.rush_hour_rate),
            ("forecast.night_rate", forecast.night_rate),
        ] {
            if !rate.is_finite() || rate < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be finite and non-negative, got {rate}"
                )));
            }
        }

        // Night modifier must stay positive over the whole horizon
        if forecast.night_rate * f64::from(forecast.horizon_hours) >= 1.0 {
            return Err(ConfigError::Invalid(format!(
                "forecast.night_rate {} drives the modifier to zero within {} hours",
                forecast.night_rate, forecast.horizon_hours
            )));
        }

        let min_score = self.attribution.min_total_score;
        if !min_score.is_finite() || min_score < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "attribution.min_total_score must be finite and non-negative, got {min_score}"
            )));
        }

        let jitter = self.outlook.jitter;
        if !(0.0..=OutlookConfig::MAX_JITTER).contains(&jitter) {
            return Err(ConfigError::Invalid(format!(
                "outlook.jitter must be in 0..={}, got {jitter}",
                OutlookConfig::MAX_JITTER
            )));
        }

        if self.outlook.days > OutlookConfig::MAX_DAYS {
            return Err(ConfigError::Invalid(format!(
                "outlook.days must be at most {}, got {}",
                OutlookConfig::MAX_DAYS,
                self.outlook.days
            )));
        }

        Ok(())
    }
}
