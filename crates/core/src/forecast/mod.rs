//! Short-horizon and multi-day AQI forecasting
//!
//! - `diurnal`: time-of-day trend applied to a baseline reading
//! - `estimator`: pluggable AQI backends (breakpoint heuristic, trained model)
//! - `series`: authoritative hourly series from an upstream service
//! - `generator`: hourly projection with live calibration
//! - `outlook`: coarse multi-day outlook

pub mod diurnal;
pub mod estimator;
mod generator;
mod outlook;
mod series;

pub use diurnal::{apply_trend, classify_hour, trend_modifier, TimeOfDay};
pub use estimator::{
    create_estimator, engineer_features, AqiEstimator, BreakpointEstimator, ModelError,
    RegressionModel, FEATURE_NAMES,
};
pub use generator::{forecast, forecast_with_points, ForecastGenerator, ForecastPoint, Provenance};
pub use outlook::{daily_outlook, DailyOutlook, SkyCondition};
pub use series::{hour_label, HourlySeries};
