//! AQI calculator
//!
//! The overall AQI is the maximum of the per-pollutant sub-indices: the worst
//! pollutant dominates. A reading without any supported pollutant yields 0
//! with [`AqiStatus::MissingData`] so callers can tell "clean air" apart from
//! "no data".

use super::breakpoints::{lookup_concentration, BreakpointTable};
use crate::core_types::{classify_risk, Pollutant, PollutantReading, RiskColor, RiskLevel};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// AQI value computed for a single pollutant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubIndex {
    pub pollutant: Pollutant,
    /// Concentration in the table's units (after conversion)
    pub concentration: f64,
    pub index: f64,
    /// True when the concentration exceeded the top tier
    pub extrapolated: bool,
}

/// Whether the result was computed from data or is a no-data placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AqiStatus {
    Computed,
    MissingData,
}

/// AQI value with its risk classification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AqiResult {
    pub aqi: f64,
    pub risk_level: RiskLevel,
    pub color: RiskColor,
    /// Pollutant that produced the maximum sub-index
    pub dominant: Option<Pollutant>,
    pub status: AqiStatus,
}

impl AqiResult {
    /// Result for a known AQI value (e.g. an authoritative live reading)
    #[must_use]
    pub fn from_value(aqi: f64, dominant: Option<Pollutant>) -> Self {
        let aqi = if aqi.is_finite() { aqi.max(0.0) } else { 0.0 };
        let (risk_level, color) = classify_risk(aqi);
        Self {
            aqi,
            risk_level,
            color,
            dominant,
            status: AqiStatus::Computed,
        }
    }

    /// Placeholder for a reading without any supported pollutant
    #[must_use]
    pub fn missing_data() -> Self {
        Self {
            status: AqiStatus::MissingData,
            ..Self::from_value(0.0, None)
        }
    }

    #[must_use]
    pub fn is_missing_data(&self) -> bool {
        self.status == AqiStatus::MissingData
    }

    /// AQI rounded to the nearest integer for display
    #[must_use]
    pub fn rounded(&self) -> u32 {
        self.aqi.round() as u32
    }
}

/// Sub-index of a single pollutant, if the reading reports it
#[must_use]
pub fn sub_index(reading: &PollutantReading, pollutant: Pollutant) -> Option<SubIndex> {
    let concentration = lookup_concentration(reading, pollutant)?;
    let lookup = BreakpointTable::for_pollutant(pollutant).lookup(concentration);

    if lookup.extrapolated {
        debug!(
            %pollutant,
            concentration,
            index = lookup.index,
            "Concentration above top breakpoint tier, extrapolating"
        );
    }

    Some(SubIndex {
        pollutant,
        concentration,
        index: lookup.index,
        extrapolated: lookup.extrapolated,
    })
}

/// Sub-indices of every reported pollutant, in canonical pollutant order
#[must_use]
pub fn sub_indices(reading: &PollutantReading) -> Vec<SubIndex> {
    Pollutant::ALL
        .into_iter()
        .filter_map(|p| sub_index(reading, p))
        .collect()
}

/// Maximum sub-index, or `None` when no supported pollutant is reported
#[must_use]
pub fn max_sub_index(reading: &PollutantReading) -> Option<SubIndex> {
    sub_indices(reading)
        .into_iter()
        .fold(None, |worst: Option<SubIndex>, candidate| match worst {
            Some(w) if w.index >= candidate.index => Some(w),
            _ => Some(candidate),
        })
}

/// Compute the AQI of a reading
///
/// # Examples
///
/// ```
/// use airzen_core::core_types::{Pollutant, PollutantReading, RiskLevel};
/// use airzen_core::aqi::compute_aqi;
///
/// let reading = PollutantReading::new().with(Pollutant::Pm25, 35.5);
/// let result = compute_aqi(&reading);
/// assert_eq!(result.aqi, 101.0);
/// assert_eq!(result.risk_level, RiskLevel::UnhealthyForSensitiveGroups);
/// ```
#[must_use]
pub fn compute_aqi(reading: &PollutantReading) -> AqiResult {
    match max_sub_index(reading) {
        Some(worst) => AqiResult::from_value(worst.index, Some(worst.pollutant)),
        None => {
            debug!("Reading contains no supported pollutant, reporting missing data");
            AqiResult::missing_data()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pm25(value: f64) -> f64 {
        compute_aqi(&PollutantReading::new().with(Pollutant::Pm25, value)).aqi
    }

    #[test]
    fn test_pm25_tier_boundaries_are_exact() {
        let boundaries = [
            (0.0, 0.0),
            (12.0, 50.0),
            (12.1, 51.0),
            (35.4, 100.0),
            (35.5, 101.0),
            (55.4, 150.0),
            (55.5, 151.0),
            (150.4, 200.0),
            (150.5, 201.0),
            (250.4, 300.0),
            (250.5, 301.0),
            (350.4, 400.0),
            (350.5, 401.0),
            (500.4, 500.0),
        ];
        for (concentration, expected) in boundaries {
            assert_eq!(pm25(concentration), expected, "PM2.5 = {concentration}");
        }
    }

    #[test]
    fn test_pm25_interior_interpolation() {
        // Midpoint of the Moderate tier
        assert_relative_eq!(pm25(23.75), 75.5, epsilon = 1e-9);
        assert_relative_eq!(pm25(6.0), 25.0, epsilon = 1e-9);
    }

    #[test]
    fn test_overall_is_maximum_sub_index() {
        let reading = PollutantReading::new()
            .with(Pollutant::Pm25, 35.5)
            .with(Pollutant::Pm10, 50.0)
            .with(Pollutant::No2, 40.0)
            .with(Pollutant::So2, 10.0)
            .with(Pollutant::Co, 1.0)
            .with(Pollutant::O3, 60.0);

        let result = compute_aqi(&reading);
        assert_eq!(result.aqi, 101.0);
        assert_eq!(result.dominant, Some(Pollutant::Pm25));
        assert_eq!(result.risk_level, RiskLevel::UnhealthyForSensitiveGroups);
        assert_eq!(result.color, RiskColor::Orange);
        assert_eq!(result.status, AqiStatus::Computed);

        let all = sub_indices(&reading);
        assert_eq!(all.len(), 6);
        assert!(all.iter().all(|s| s.index <= result.aqi));
    }

    #[test]
    fn test_ozone_can_dominate() {
        // 180 µg/m³ → 90 ppb → Unhealthy tier
        let reading = PollutantReading::new()
            .with(Pollutant::Pm25, 5.0)
            .with(Pollutant::O3, 180.0);
        let result = compute_aqi(&reading);
        assert_eq!(result.dominant, Some(Pollutant::O3));
        assert!(result.aqi > 150.0 && result.aqi < 200.0);
    }

    #[test]
    fn test_empty_reading_is_missing_data() {
        let result = compute_aqi(&PollutantReading::new());
        assert_eq!(result.aqi, 0.0);
        assert!(result.is_missing_data());
        assert_eq!(result.dominant, None);
        assert_eq!(result.risk_level, RiskLevel::Good);
    }

    #[test]
    fn test_zero_reading_is_computed_not_missing() {
        let result = compute_aqi(&PollutantReading::new().with(Pollutant::Pm10, 0.0));
        assert_eq!(result.aqi, 0.0);
        assert!(!result.is_missing_data());
    }

    #[test]
    fn test_above_top_tier_never_returns_zero() {
        let result = compute_aqi(&PollutantReading::new().with(Pollutant::Pm10, 900.0));
        assert!(result.aqi > 500.0);
        assert_eq!(result.risk_level, RiskLevel::Hazardous);
        assert!(sub_indices(&PollutantReading::new().with(Pollutant::Pm10, 900.0))[0].extrapolated);
    }

    #[test]
    fn test_rounded() {
        assert_eq!(AqiResult::from_value(75.5, None).rounded(), 76);
        assert_eq!(AqiResult::from_value(-3.0, None).rounded(), 0);
    }
}
