//! Health-risk classification of AQI values

use serde::{Deserialize, Serialize};
use std::fmt;

/// EPA health-risk category, ordered from best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "Good")]
    Good,
    #[serde(rename = "Moderate")]
    Moderate,
    #[serde(rename = "Unhealthy for Sensitive Groups")]
    UnhealthyForSensitiveGroups,
    #[serde(rename = "Unhealthy")]
    Unhealthy,
    #[serde(rename = "Very Unhealthy")]
    VeryUnhealthy,
    #[serde(rename = "Hazardous")]
    Hazardous,
}

/// Display colour paired 1:1 with a [`RiskLevel`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskColor {
    Green,
    Yellow,
    Orange,
    Red,
    Purple,
    Maroon,
}

impl RiskLevel {
    /// Upper AQI bound (inclusive) of each category except `Hazardous`
    const THRESHOLDS: [(f64, RiskLevel); 5] = [
        (50.0, RiskLevel::Good),
        (100.0, RiskLevel::Moderate),
        (150.0, RiskLevel::UnhealthyForSensitiveGroups),
        (200.0, RiskLevel::Unhealthy),
        (300.0, RiskLevel::VeryUnhealthy),
    ];

    /// Classify an AQI value
    #[must_use]
    pub fn from_aqi(aqi: f64) -> Self {
        Self::THRESHOLDS
            .iter()
            .find(|(upper, _)| aqi <= *upper)
            .map_or(RiskLevel::Hazardous, |(_, level)| *level)
    }

    /// Display colour for this category
    #[must_use]
    pub const fn color(self) -> RiskColor {
        match self {
            Self::Good => RiskColor::Green,
            Self::Moderate => RiskColor::Yellow,
            Self::UnhealthyForSensitiveGroups => RiskColor::Orange,
            Self::Unhealthy => RiskColor::Red,
            Self::VeryUnhealthy => RiskColor::Purple,
            Self::Hazardous => RiskColor::Maroon,
        }
    }

    /// Human-readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            Self::Unhealthy => "Unhealthy",
            Self::VeryUnhealthy => "Very Unhealthy",
            Self::Hazardous => "Hazardous",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl RiskColor {
    /// Lowercase colour tag
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Orange => "orange",
            Self::Red => "red",
            Self::Purple => "purple",
            Self::Maroon => "maroon",
        }
    }
}

impl fmt::Display for RiskColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Classify an AQI value into its risk level and display colour
///
/// NaN is treated as the worst case.
#[must_use]
pub fn classify_risk(aqi: f64) -> (RiskLevel, RiskColor) {
    let level = RiskLevel::from_aqi(aqi);
    (level, level.color())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds_are_inclusive() {
        assert_eq!(classify_risk(0.0), (RiskLevel::Good, RiskColor::Green));
        assert_eq!(classify_risk(50.0), (RiskLevel::Good, RiskColor::Green));
        assert_eq!(classify_risk(50.01), (RiskLevel::Moderate, RiskColor::Yellow));
        assert_eq!(classify_risk(100.0), (RiskLevel::Moderate, RiskColor::Yellow));
        assert_eq!(
            classify_risk(101.0),
            (RiskLevel::UnhealthyForSensitiveGroups, RiskColor::Orange)
        );
        assert_eq!(
            classify_risk(150.0),
            (RiskLevel::UnhealthyForSensitiveGroups, RiskColor::Orange)
        );
        assert_eq!(classify_risk(200.0), (RiskLevel::Unhealthy, RiskColor::Red));
        assert_eq!(classify_risk(300.0), (RiskLevel::VeryUnhealthy, RiskColor::Purple));
        assert_eq!(classify_risk(300.5), (RiskLevel::Hazardous, RiskColor::Maroon));
        assert_eq!(classify_risk(999.0), (RiskLevel::Hazardous, RiskColor::Maroon));
    }

    #[test]
    fn test_nan_is_hazardous() {
        assert_eq!(RiskLevel::from_aqi(f64::NAN), RiskLevel::Hazardous);
    }

    #[test]
    fn test_levels_are_ordered() {
        assert!(RiskLevel::Good < RiskLevel::Moderate);
        assert!(RiskLevel::VeryUnhealthy < RiskLevel::Hazardous);
    }

    #[test]
    fn test_labels_and_serde() {
        assert_eq!(
            RiskLevel::UnhealthyForSensitiveGroups.to_string(),
            "Unhealthy for Sensitive Groups"
        );
        assert_eq!(
            serde_json::to_string(&RiskLevel::VeryUnhealthy).unwrap(),
            r#""Very Unhealthy""#
        );
        assert_eq!(serde_json::to_string(&RiskColor::Maroon).unwrap(), r#""maroon""#);
    }
}
