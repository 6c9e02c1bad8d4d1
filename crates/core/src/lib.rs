//! Air quality engine
//!
//! Deterministic, explainable AQI modelling for real-time advisory display.
//! Implements the US EPA breakpoint AQI, heuristic attribution of pollution to
//! emission sources, reverse modelling of source-reduction policies and a
//! short-horizon forecast calibrated against live data.
//!
//! ## Operations
//!
//! - [`compute_aqi`]: maximum EPA sub-index across the reported pollutants
//! - [`classify_risk`]: health-risk category and display colour of an AQI
//! - [`attribute_sources`]: percentage split across five emission categories
//! - [`simulate_policy`]: AQI after reducing selected emission sources
//! - [`forecast`]: AQI for the next hours, preferring an authoritative series
//!
//! [`AirQualityEngine`] wraps all of them behind a configured handle and adds
//! full reports, multi-day outlooks and batch evaluation.
//!
//! ```
//! use airzen_core::{compute_aqi, Pollutant, PollutantReading, RiskLevel};
//!
//! let reading = PollutantReading::new()
//!     .with(Pollutant::Pm25, 35.5)
//!     .with(Pollutant::Pm10, 50.0)
//!     .with(Pollutant::No2, 40.0)
//!     .with(Pollutant::So2, 10.0)
//!     .with(Pollutant::Co, 1.0)
//!     .with(Pollutant::O3, 60.0);
//!
//! let result = compute_aqi(&reading);
//! assert_eq!(result.aqi, 101.0);
//! assert_eq!(result.risk_level, RiskLevel::UnhealthyForSensitiveGroups);
//! ```

// Core types and units
pub mod core_types;

// Engine modules
pub mod aqi;
pub mod attribution;
pub mod config;
pub mod engine;
pub mod feed;
pub mod forecast;
pub mod policy;

// Re-export core types
pub use core_types::{
    classify_risk, MicrogramsPerCubicMeter, MilligramsPerCubicMeter, PartsPerBillion, Pollutant,
    PollutantParseError, PollutantReading, RiskColor, RiskLevel,
};

// Re-export engine types
pub use aqi::{compute_aqi, AqiResult, AqiStatus, SubIndex};
pub use attribution::{attribute_sources, SourceAttribution, SourceCategory};
pub use config::{ConfigError, EngineConfig};
pub use engine::{AirQualityEngine, AirQualityReport, ReportProvenance};
pub use feed::{FeedError, LiveConditions, LiveResponse};
pub use forecast::{
    forecast, forecast_with_points, AqiEstimator, DailyOutlook, ForecastGenerator, ForecastPoint, HourlySeries,
    ModelError, Provenance, RegressionModel,
};
pub use policy::{
    simulate_policy, EmissionSource, PolicyMultipliers, PolicyOutcome, SimulationRequest,
};
