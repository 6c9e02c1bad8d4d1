//! Engine facade
//!
//! [`AirQualityEngine`] bundles a configuration with a forecast generator and
//! exposes every operation of the crate behind one immutable handle. It holds
//! no mutable state, so a single engine can be shared across threads and
//! requests.

use crate::aqi::{self, AqiResult};
use crate::attribution::{attribute_sources_with, SourceAttribution};
use crate::config::{ConfigError, EngineConfig};
use crate::core_types::{Pollutant, PollutantReading, RiskColor, RiskLevel};
use crate::feed::{FeedError, LiveResponse};
use crate::forecast::{
    daily_outlook, DailyOutlook, ForecastGenerator, ForecastPoint, HourlySeries, RegressionModel,
};
use crate::policy::{self, PolicyMultipliers, PolicyOutcome};
use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Where the headline AQI of a report came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportProvenance {
    /// Authoritative value from a live source
    Live,
    /// Computed from the reading by the breakpoint calculator
    Estimated,
}

/// Everything known about one location at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQualityReport {
    pub aqi: f64,
    pub risk_level: RiskLevel,
    pub color: RiskColor,
    /// Pollutant with the highest sub-index, if any was reported
    pub dominant: Option<Pollutant>,
    pub pollutants: PollutantReading,
    pub pollution_sources: SourceAttribution,
    /// Authoritative series when available, projection otherwise
    pub forecast: Vec<ForecastPoint>,
    /// Projection only
    pub ml_forecast: Vec<ForecastPoint>,
    pub provenance: ReportProvenance,
}

/// Configured AQI engine
#[derive(Debug)]
pub struct AirQualityEngine {
    config: EngineConfig,
    generator: ForecastGenerator,
}

impl Default for AirQualityEngine {
    fn default() -> Self {
        Self::build(EngineConfig::default(), None)
    }
}

impl AirQualityEngine {
    /// Engine with the breakpoint heuristic as forecast backend
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] if `config` fails [`EngineConfig::validate`]
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, None))
    }

    /// Engine forecasting with a trained model
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] if `config` fails [`EngineConfig::validate`]
    pub fn with_model(config: EngineConfig, model: RegressionModel) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, Some(model)))
    }

    fn build(config: EngineConfig, model: Option<RegressionModel>) -> Self {
        let generator = ForecastGenerator::new(config.forecast.clone(), model);
        info!(
            estimator = generator.estimator_name(),
            horizon_hours = generator.horizon_hours(),
            "Air quality engine ready"
        );
        Self { config, generator }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn generator(&self) -> &ForecastGenerator {
        &self.generator
    }

    #[must_use]
    pub fn compute_aqi(&self, reading: &PollutantReading) -> AqiResult {
        aqi::compute_aqi(reading)
    }

    /// AQI of many readings, evaluated in parallel. Output order matches input.
    #[must_use]
    pub fn compute_aqi_batch(&self, readings: &[PollutantReading]) -> Vec<AqiResult> {
        readings.par_iter().map(aqi::compute_aqi).collect()
    }

    #[must_use]
    pub fn attribute_sources(&self, reading: &PollutantReading) -> SourceAttribution {
        attribute_sources_with(reading, &self.config.attribution)
    }

    #[must_use]
    pub fn simulate_policy(
        &self,
        baseline: &PollutantReading,
        multipliers: &PolicyMultipliers,
    ) -> PolicyOutcome {
        policy::simulate_policy(baseline, multipliers)
    }

    #[must_use]
    pub fn forecast(
        &self,
        baseline: &PollutantReading,
        reference_hour: u32,
        authoritative_aqi: Option<f64>,
        series: Option<&HourlySeries>,
    ) -> Vec<ForecastPoint> {
        self.generator
            .forecast(baseline, reference_hour, authoritative_aqi, series)
    }

    /// Multi-day outlook starting the day after `today`
    #[must_use]
    pub fn outlook<R: Rng>(&self, aqi: f64, today: NaiveDate, rng: &mut R) -> Vec<DailyOutlook> {
        daily_outlook(aqi, today, &self.config.outlook, rng)
    }

    /// Full report for a reading
    ///
    /// The headline AQI is the authoritative value when one is given and
    /// usable, the computed AQI otherwise. Attribution and forecasts always
    /// derive from the reading itself.
    #[must_use]
    pub fn assess(
        &self,
        reading: &PollutantReading,
        reference_hour: u32,
        authoritative_aqi: Option<f64>,
        series: Option<&HourlySeries>,
    ) -> AirQualityReport {
        let computed = self.compute_aqi(reading);
        let live = authoritative_aqi.filter(|a| a.is_finite() && *a >= 0.0);

        let (headline, provenance) = match live {
            Some(value) => (AqiResult::from_value(value, computed.dominant), ReportProvenance::Live),
            None => (computed, ReportProvenance::Estimated),
        };

        let ml_forecast = self
            .generator
            .project(reading, reference_hour, live, series);
        let forecast = series
            .map(|s| s.upcoming(reference_hour, self.generator.horizon_hours()))
            .filter(|points| !points.is_empty())
            .unwrap_or_else(|| ml_forecast.clone());

        debug!(
            aqi = headline.aqi,
            ?provenance,
            forecast_points = forecast.len(),
            "Assessment complete"
        );

        AirQualityReport {
            aqi: headline.aqi,
            risk_level: headline.risk_level,
            color: headline.color,
            dominant: headline.dominant,
            pollutants: *reading,
            pollution_sources: self.attribute_sources(reading),
            forecast,
            ml_forecast,
            provenance,
        }
    }

    /// Full report for a decoded live payload at wall-clock time `now`
    ///
    /// # Errors
    /// Returns [`FeedError::MissingCurrent`] when the payload has no current block
    pub fn assess_live(
        &self,
        response: &LiveResponse,
        now: DateTime<Utc>,
    ) -> Result<AirQualityReport, FeedError> {
        let conditions = response.conditions()?;
        Ok(self.assess(
            &conditions.reading(),
            response.reference_hour(now),
            conditions.authoritative_aqi(),
            response.series(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::Provenance;
    use crate::policy::EmissionSource;
    use chrono::TimeZone;

    fn reading() -> PollutantReading {
        PollutantReading::new()
            .with(Pollutant::Pm25, 35.5)
            .with(Pollutant::No2, 40.0)
            .with(Pollutant::Co, 1.0)
    }

    #[test]
    fn test_assess_without_live_data() {
        let engine = AirQualityEngine::default();
        let report = engine.assess(&reading(), 12, None, None);

        assert_eq!(report.provenance, ReportProvenance::Estimated);
        assert_eq!(report.aqi, 101.0);
        assert_eq!(report.dominant, Some(Pollutant::Pm25));
        assert_eq!(report.risk_level, RiskLevel::UnhealthyForSensitiveGroups);
        assert_eq!(report.pollution_sources.total(), 100);
        assert_eq!(report.forecast, report.ml_forecast);
        assert_eq!(report.ml_forecast.len(), 3);
    }

    #[test]
    fn test_assess_prefers_live_aqi() {
        let engine = AirQualityEngine::default();
        let report = engine.assess(&reading(), 12, Some(42.0), None);

        assert_eq!(report.provenance, ReportProvenance::Live);
        assert_eq!(report.aqi, 42.0);
        assert_eq!(report.color, RiskColor::Green);
        // Calibrated against the live value: 101 → 42 at flat daytime hours
        assert!(report.ml_forecast.iter().all(|p| p.aqi == 42.0));
    }

    #[test]
    fn test_assess_uses_series_for_forecast() {
        let engine = AirQualityEngine::default();
        let time = (0..24).map(|h| format!("2025-03-14T{h:02}:00")).collect();
        let series = HourlySeries::new(time, vec![Some(64.0); 24]);

        let report = engine.assess(&reading(), 12, None, Some(&series));
        assert!(report.forecast.iter().all(|p| p.provenance == Provenance::Satellite));
        assert!(report.ml_forecast.iter().all(|p| p.provenance == Provenance::Ml));
        assert_eq!(report.ml_forecast[0].label, "01 PM");
    }

    #[test]
    fn test_assess_live_payload() {
        let payload = r#"{
            "utc_offset_seconds": 0,
            "current": {"us_aqi": 55, "pm2_5": 15.2, "carbon_monoxide": 300.0}
        }"#;
        let response = LiveResponse::from_json_str(payload).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap();

        let report = AirQualityEngine::default().assess_live(&response, now).unwrap();
        assert_eq!(report.aqi, 55.0);
        assert_eq!(report.pollutants.get(Pollutant::Co), Some(0.3));
        assert_eq!(report.forecast.len(), 3);
    }

    #[test]
    fn test_batch_matches_single() {
        let engine = AirQualityEngine::default();
        let readings: Vec<_> = (0..64)
            .map(|i| PollutantReading::new().with(Pollutant::Pm25, f64::from(i) * 4.0))
            .collect();
        let batch = engine.compute_aqi_batch(&readings);
        for (reading, result) in readings.iter().zip(&batch) {
            assert_eq!(*result, engine.compute_aqi(reading));
        }
    }

    #[test]
    fn test_constructors_validate_config() {
        let mut config = EngineConfig::default();
        config.outlook.jitter = f64::INFINITY;
        assert!(matches!(
            AirQualityEngine::new(config.clone()),
            Err(ConfigError::Invalid(_))
        ));

        config = EngineConfig::default();
        config.forecast.horizon_hours = 1_000;
        assert!(AirQualityEngine::new(config).is_err());

        assert!(AirQualityEngine::new(EngineConfig::default()).is_ok());
    }

    #[test]
    fn test_policy_through_engine() {
        let engine = AirQualityEngine::default();
        let multipliers = PolicyMultipliers::new().with(EmissionSource::Traffic, 0.5);
        let outcome = engine.simulate_policy(&reading(), &multipliers);
        assert!(outcome.simulated_aqi < outcome.original_aqi);
    }
}
