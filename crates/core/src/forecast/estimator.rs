//! AQI estimator backends
//!
//! The forecast generator asks an [`AqiEstimator`] for the AQI of each
//! projected reading. Two backends exist:
//!
//! - [`BreakpointEstimator`]: the EPA breakpoint calculator (always available)
//! - [`RegressionModel`]: a trained linear model loaded from an exported
//!   coefficient file and passed in explicitly
//!
//! Use [`create_estimator`] to pick the model when one is supplied and fall
//! back to the breakpoint calculator otherwise.

use crate::aqi::compute_aqi;
use crate::core_types::{Pollutant, PollutantReading};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::info;

/// Backend-agnostic AQI estimation
pub trait AqiEstimator: Send + Sync + fmt::Debug {
    /// Short backend name for logs and reports
    fn name(&self) -> &'static str;

    /// Estimated AQI, or `None` when the reading carries nothing to estimate from
    fn estimate(&self, reading: &PollutantReading) -> Option<f64>;
}

/// Heuristic backend: EPA breakpoint interpolation
#[derive(Debug, Clone, Copy, Default)]
pub struct BreakpointEstimator;

impl AqiEstimator for BreakpointEstimator {
    fn name(&self) -> &'static str {
        "breakpoint"
    }

    fn estimate(&self, reading: &PollutantReading) -> Option<f64> {
        let result = compute_aqi(reading);
        (!result.is_missing_data()).then_some(result.aqi)
    }
}

/// Errors that can occur while loading a trained model
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Failed to read the model file
    #[error("failed to read model: {0}")]
    Read(#[from] std::io::Error),
    /// Failed to parse the model file
    #[error("failed to parse model: {0}")]
    Parse(#[from] serde_json::Error),
    /// Parsed, but the parameters do not match the feature layout
    #[error("invalid model: {0}")]
    Shape(String),
}

/// Model input features, in the order the coefficients are stored
pub const FEATURE_NAMES: [&str; 11] = [
    "PM2.5",
    "PM10",
    "NO2",
    "SO2",
    "CO",
    "O3",
    "PM_ratio",
    "PM_total",
    "NOx_O3_ratio",
    "Industrial_indicator",
    "Traffic_indicator",
];

/// Raw and engineered features for a reading
///
/// Missing pollutants take their model defaults first.
#[must_use]
pub fn engineer_features(reading: &PollutantReading) -> [f64; 11] {
    let filled = reading.with_model_defaults();
    let pm25 = filled.value_or_zero(Pollutant::Pm25);
    let pm10 = filled.value_or_zero(Pollutant::Pm10);
    let no2 = filled.value_or_zero(Pollutant::No2);
    let so2 = filled.value_or_zero(Pollutant::So2);
    let co = filled.value_or_zero(Pollutant::Co);
    let o3 = filled.value_or_zero(Pollutant::O3);

    [
        pm25,
        pm10,
        no2,
        so2,
        co,
        o3,
        pm25 / (pm10 + 1.0),
        pm25 + pm10,
        no2 / (o3 + 1.0),
        so2 * co,
        no2 * co,
    ]
}

/// Immutable handle to a trained, standardized linear regression
///
/// `prediction = intercept + Σ coefficient_i × (feature_i - mean_i) / scale_i`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionModel {
    /// Optional feature order recorded at export time, checked on load
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
    pub means: Vec<f64>,
    pub scales: Vec<f64>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl RegressionModel {
    /// Parse and validate an exported model
    ///
    /// # Errors
    /// Returns error if the JSON is malformed or the parameters do not fit
    /// the feature layout
    pub fn from_json_str(json: &str) -> Result<Self, ModelError> {
        let model: Self = serde_json::from_str(json)?;
        model.validate()?;
        Ok(model)
    }

    /// Load an exported model from a JSON file
    ///
    /// # Errors
    /// Returns error if the file cannot be read, parsed or validated
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Check parameter shapes and values
    ///
    /// # Errors
    /// Returns [`ModelError::Shape`] describing the first problem found
    pub fn validate(&self) -> Result<(), ModelError> {
        let expected = FEATURE_NAMES.len();
        for (name, len) in [
            ("means", self.means.len()),
            ("scales", self.scales.len()),
            ("coefficients", self.coefficients.len()),
        ] {
            if len != expected {
                return Err(ModelError::Shape(format!(
                    "{name} has {len} entries, expected {expected}"
                )));
            }
        }

        if let Some(names) = &self.feature_names {
            if names.iter().map(String::as_str).ne(FEATURE_NAMES) {
                return Err(ModelError::Shape(format!(
                    "feature order {names:?} does not match {FEATURE_NAMES:?}"
                )));
            }
        }

        if self.scales.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(ModelError::Shape("scales must be finite and positive".to_string()));
        }

        let all_finite = self
            .means
            .iter()
            .chain(&self.coefficients)
            .chain(std::iter::once(&self.intercept))
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(ModelError::Shape("parameters must be finite".to_string()));
        }

        Ok(())
    }

    /// Raw model output (may be negative)
    #[must_use]
    pub fn predict(&self, reading: &PollutantReading) -> f64 {
        let features = engineer_features(reading);
        features
            .iter()
            .zip(&self.means)
            .zip(&self.scales)
            .zip(&self.coefficients)
            .fold(self.intercept, |acc, (((x, mean), scale), coef)| {
                acc + coef * (x - mean) / scale
            })
    }
}

impl AqiEstimator for RegressionModel {
    fn name(&self) -> &'static str {
        "regression"
    }

    fn estimate(&self, reading: &PollutantReading) -> Option<f64> {
        let prediction = self.predict(reading);
        prediction.is_finite().then_some(prediction.max(0.0))
    }
}

/// Select an estimator backend
///
/// Uses the trained model when one is supplied, the breakpoint calculator
/// otherwise.
pub fn create_estimator(model: Option<RegressionModel>) -> Box<dyn AqiEstimator> {
    match model {
        Some(model) => {
            info!("Using trained regression model for forecast estimation");
            Box::new(model)
        }
        None => {
            info!("No trained model supplied, using breakpoint heuristic");
            Box::new(BreakpointEstimator)
        }
    }
}
