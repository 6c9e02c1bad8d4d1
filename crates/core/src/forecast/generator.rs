//! Short-horizon forecast generation
//!
//! The generator projects a baseline reading forward hour by hour using the
//! diurnal trend, asks its [`AqiEstimator`] for each projected AQI and, when an
//! authoritative current AQI is known, rescales every point so the model's
//! "now" estimate lines up with it.

use super::diurnal::{apply_trend, trend_modifier};
use super::estimator::{create_estimator, AqiEstimator, BreakpointEstimator, RegressionModel};
use super::series::{hour_label, HourlySeries};
use crate::config::ForecastConfig;
use crate::core_types::PollutantReading;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Where a forecast point came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Upstream hourly series
    Satellite,
    /// Projected by the forecast generator
    Ml,
}

/// One forecast entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    #[serde(rename = "hour")]
    pub label: String,
    pub aqi: f64,
    #[serde(rename = "source")]
    pub provenance: Provenance,
}

impl ForecastPoint {
    /// AQI is rounded to whole index points and floored at 0
    #[must_use]
    pub fn new(label: impl Into<String>, aqi: f64, provenance: Provenance) -> Self {
        Self {
            label: label.into(),
            aqi: aqi.max(0.0).round_ties_even(),
            provenance,
        }
    }
}

/// Projects AQI for the next few hours
#[derive(Debug)]
pub struct ForecastGenerator {
    config: ForecastConfig,
    estimator: Box<dyn AqiEstimator>,
}

impl Default for ForecastGenerator {
    fn default() -> Self {
        Self::new(ForecastConfig::default(), None)
    }
}

impl ForecastGenerator {
    /// Generator using the trained model when given, the breakpoint heuristic otherwise
    #[must_use]
    pub fn new(config: ForecastConfig, model: Option<RegressionModel>) -> Self {
        Self::with_estimator(config, create_estimator(model))
    }

    #[must_use]
    pub fn with_estimator(config: ForecastConfig, estimator: Box<dyn AqiEstimator>) -> Self {
        Self { config, estimator }
    }

    #[must_use]
    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    #[must_use]
    pub fn estimator_name(&self) -> &'static str {
        self.estimator.name()
    }

    /// Configured horizon, capped at [`ForecastConfig::MAX_HORIZON_HOURS`]
    #[must_use]
    pub fn horizon_hours(&self) -> u32 {
        self.config.horizon_hours.min(ForecastConfig::MAX_HORIZON_HOURS)
    }

    /// Ratio anchoring the model's "now" estimate to a trusted current AQI
    ///
    /// Returns 1 when there is no usable authoritative value or the model
    /// cannot estimate the unscaled baseline (absent, zero or non-finite).
    #[must_use]
    pub fn calibration_factor(&self, baseline: &PollutantReading, authoritative_aqi: Option<f64>) -> f64 {
        let Some(authoritative) = authoritative_aqi.filter(|a| a.is_finite() && *a >= 0.0) else {
            return 1.0;
        };

        match self.estimator.estimate(baseline) {
            Some(now) if now.is_finite() && now > 0.0 => authoritative / now,
            _ => {
                debug!("Model estimate for now is unusable, skipping calibration");
                1.0
            }
        }
    }

    /// Generator-only projection, tagged [`Provenance::Ml`]
    ///
    /// Labels follow the series' hour convention when it covers the hour and
    /// fall back to `HH:00` otherwise. An empty baseline yields no points.
    #[must_use]
    pub fn project(
        &self,
        baseline: &PollutantReading,
        reference_hour: u32,
        authoritative_aqi: Option<f64>,
        series: Option<&HourlySeries>,
    ) -> Vec<ForecastPoint> {
        if baseline.is_empty() {
            debug!("Empty baseline, no forecast projected");
            return Vec::new();
        }

        let reference_hour = reference_hour % 24;
        let factor = self.calibration_factor(baseline, authoritative_aqi);

        (1..=self.horizon_hours())
            .filter_map(|offset| {
                let modifier = trend_modifier(reference_hour, offset, &self.config);
                let projected = apply_trend(baseline, modifier);
                let raw = self.estimator.estimate(&projected)?;

                let index = (reference_hour + offset) as usize;
                let label = series
                    .and_then(|s| s.label_for_index(index))
                    .unwrap_or_else(|| hour_label(reference_hour + offset));

                Some(ForecastPoint::new(label, raw * factor, Provenance::Ml))
            })
            .collect()
    }

    /// Forecast for the next hours
    ///
    /// A series with values for the upcoming hours takes precedence entirely;
    /// otherwise the generator's projection is returned.
    #[must_use]
    pub fn forecast(
        &self,
        baseline: &PollutantReading,
        reference_hour: u32,
        authoritative_aqi: Option<f64>,
        series: Option<&HourlySeries>,
    ) -> Vec<ForecastPoint> {
        if let Some(series) = series {
            let upcoming = series.upcoming(reference_hour, self.horizon_hours());
            if !upcoming.is_empty() {
                return upcoming;
            }
            debug!("Hourly series has no upcoming values, using projection");
        }
        self.project(baseline, reference_hour, authoritative_aqi, series)
    }

    /// Forecast against ready-made authoritative points
    ///
    /// Non-empty `points` take precedence and are returned as given, truncated
    /// to the horizon. Otherwise the projection is returned with `HH:00` labels.
    #[must_use]
    pub fn forecast_with_points(
        &self,
        baseline: &PollutantReading,
        reference_hour: u32,
        authoritative_aqi: Option<f64>,
        points: Option<&[ForecastPoint]>,
    ) -> Vec<ForecastPoint> {
        match points.filter(|p| !p.is_empty()) {
            Some(points) => points.iter().take(self.horizon_hours() as usize).cloned().collect(),
            None => self.project(baseline, reference_hour, authoritative_aqi, None),
        }
    }
}

/// Forecast with the default configuration and the breakpoint estimator
#[must_use]
pub fn forecast(
    baseline: &PollutantReading,
    reference_hour: u32,
    authoritative_aqi: Option<f64>,
    series: Option<&HourlySeries>,
) -> Vec<ForecastPoint> {
    ForecastGenerator::with_estimator(ForecastConfig::default(), Box::new(BreakpointEstimator))
        .forecast(baseline, reference_hour, authoritative_aqi, series)
}

/// [`forecast`] for callers holding authoritative points instead of a series
#[must_use]
pub fn forecast_with_points(
    baseline: &PollutantReading,
    reference_hour: u32,
    authoritative_aqi: Option<f64>,
    points: Option<&[ForecastPoint]>,
) -> Vec<ForecastPoint> {
    ForecastGenerator::with_estimator(ForecastConfig::default(), Box::new(BreakpointEstimator))
        .forecast_with_points(baseline, reference_hour, authoritative_aqi, points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::Pollutant;
    use approx::assert_relative_eq;

    fn generator() -> ForecastGenerator {
        ForecastGenerator::with_estimator(ForecastConfig::default(), Box::new(BreakpointEstimator))
    }

    fn pm25(value: f64) -> PollutantReading {
        PollutantReading::new().with(Pollutant::Pm25, value)
    }

    #[test]
    fn test_three_ml_points_with_hour_labels() {
        let points = generator().forecast(&pm25(12.0), 12, None, None);
        assert_eq!(points.len(), 3);
        assert!(points.iter().all(|p| p.provenance == Provenance::Ml));
        let labels: Vec<_> = points.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["13:00", "14:00", "15:00"]);
        // Daytime: modifier 1, PM2.5 12.0 stays at AQI 50
        assert!(points.iter().all(|p| p.aqi == 50.0));
    }

    #[test]
    fn test_labels_wrap_past_midnight() {
        let points = generator().forecast(&pm25(12.0), 22, None, None);
        let labels: Vec<_> = points.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["23:00", "00:00", "01:00"]);
    }

    #[test]
    fn test_rush_hour_raises_forecast() {
        let points = generator().forecast(&pm25(30.0), 6, None, None);
        assert!(points[0].aqi < points[1].aqi);
        assert!(points[1].aqi < points[2].aqi);
    }

    #[test]
    fn test_calibration_factor() {
        let forecaster = generator();
        let baseline = pm25(12.0);
        assert_relative_eq!(forecaster.calibration_factor(&baseline, Some(100.0)), 2.0, epsilon = 1e-12);
        assert_eq!(forecaster.calibration_factor(&baseline, None), 1.0);
        assert_eq!(forecaster.calibration_factor(&baseline, Some(f64::NAN)), 1.0);
        // Model estimate of 0 cannot anchor anything
        assert_eq!(forecaster.calibration_factor(&pm25(0.0), Some(80.0)), 1.0);
    }

    #[test]
    fn test_calibrated_points_scale_with_factor() {
        let points = generator().forecast(&pm25(12.0), 12, Some(100.0), None);
        assert!(points.iter().all(|p| p.aqi == 100.0));
    }

    #[test]
    fn test_empty_baseline_projects_nothing() {
        assert!(generator().forecast(&PollutantReading::new(), 9, Some(40.0), None).is_empty());
    }

    #[test]
    fn test_series_takes_precedence() {
        let time = (0..24).map(|h| format!("2025-03-14T{h:02}:00")).collect();
        let series = HourlySeries::new(time, vec![Some(77.0); 24]);

        let points = generator().forecast(&pm25(12.0), 8, None, Some(&series));
        assert_eq!(points.len(), 3);
        assert!(points.iter().all(|p| p.provenance == Provenance::Satellite && p.aqi == 77.0));
        assert_eq!(points[0].label, "09 AM");
    }

    #[test]
    fn test_projection_borrows_series_labels() {
        let time = (0..24).map(|h| format!("2025-03-14T{h:02}:00")).collect();
        let series = HourlySeries::new(time, vec![None; 24]);

        // No values upstream, so the projection is used with the series' labels
        let points = generator().forecast(&pm25(12.0), 13, None, Some(&series));
        let labels: Vec<_> = points.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["02 PM", "03 PM", "04 PM"]);
        assert!(points.iter().all(|p| p.provenance == Provenance::Ml));
    }

    #[test]
    fn test_oversized_horizon_is_capped() {
        let config = ForecastConfig {
            horizon_hours: u32::MAX,
            ..ForecastConfig::default()
        };
        let forecaster = ForecastGenerator::with_estimator(config, Box::new(BreakpointEstimator));
        assert_eq!(forecaster.horizon_hours(), ForecastConfig::MAX_HORIZON_HOURS);
        assert_eq!(forecaster.forecast(&pm25(12.0), 23, None, None).len(), 3);
    }

    #[test]
    fn test_ready_made_points_take_precedence() {
        let upstream: Vec<_> = ["01 PM", "02 PM", "03 PM", "04 PM"]
            .into_iter()
            .map(|label| ForecastPoint::new(label, 61.0, Provenance::Satellite))
            .collect();

        let points = generator().forecast_with_points(&pm25(12.0), 12, Some(90.0), Some(upstream.as_slice()));
        assert_eq!(points, upstream[..3]);

        // Empty points fall back to the projection
        let points = generator().forecast_with_points(&pm25(12.0), 12, None, Some(&[][..]));
        assert_eq!(points.len(), 3);
        assert!(points.iter().all(|p| p.provenance == Provenance::Ml));
        assert_eq!(points[0].label, "13:00");
    }

    #[test]
    fn test_point_serializes_with_wire_keys() {
        let point = ForecastPoint::new("01 PM", 42.4, Provenance::Ml);
        let json = serde_json::to_value(&point).unwrap();
        assert_eq!(json["hour"], "01 PM");
        assert_eq!(json["aqi"], 42.0);
        assert_eq!(json["source"], "ml");
    }
}
