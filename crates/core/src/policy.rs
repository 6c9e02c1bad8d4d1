//! Reverse-modeling policy simulator
//!
//! Projects the AQI under hypothetical source reductions. Each emission source
//! contributes a fixed share ("impact") of some pollutants; scaling a source by
//! a multiplier `m` rescales each affected pollutant by
//!
//! new = old × ((1 - impact) + impact × m)
//!
//! which is evaluated as `old × (1 - impact × (1 - m))` so that `m = 1` is an
//! exact no-op. Sources compose sequentially in the order the caller lists
//! them.

use crate::aqi::compute_aqi;
use crate::core_types::{classify_risk, Pollutant, PollutantReading, RiskColor, RiskLevel};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Emission source a policy can act on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmissionSource {
    Traffic,
    Industrial,
    Power,
    Biomass,
    Dust,
}

impl EmissionSource {
    pub const ALL: [EmissionSource; 5] = [
        EmissionSource::Traffic,
        EmissionSource::Industrial,
        EmissionSource::Power,
        EmissionSource::Biomass,
        EmissionSource::Dust,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Traffic => "traffic",
            Self::Industrial => "industrial",
            Self::Power => "power",
            Self::Biomass => "biomass",
            Self::Dust => "dust",
        }
    }

    /// Share of each pollutant attributed to this source
    #[must_use]
    pub const fn impacts(self) -> &'static [(Pollutant, f64)] {
        match self {
            Self::Traffic => &[
                (Pollutant::No2, 0.6),
                (Pollutant::Co, 0.8),
                (Pollutant::Pm25, 0.3),
                (Pollutant::O3, 0.5),
            ],
            Self::Industrial => &[
                (Pollutant::So2, 0.5),
                (Pollutant::Pm10, 0.3),
                (Pollutant::Pm25, 0.3),
            ],
            Self::Power => &[(Pollutant::So2, 0.5), (Pollutant::No2, 0.2)],
            Self::Biomass => &[(Pollutant::Pm25, 0.2), (Pollutant::Co, 0.2)],
            Self::Dust => &[(Pollutant::Pm10, 0.6), (Pollutant::Pm25, 0.1)],
        }
    }

    /// Impact on a single pollutant (0 when unaffected)
    #[must_use]
    pub fn impact_on(self, pollutant: Pollutant) -> f64 {
        self.impacts()
            .iter()
            .find(|(p, _)| *p == pollutant)
            .map_or(0.0, |(_, impact)| *impact)
    }
}

impl fmt::Display for EmissionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a key does not name a known emission source
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown emission source '{0}'")]
pub struct SourceParseError(pub String);

impl FromStr for EmissionSource {
    type Err = SourceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "traffic" => Ok(Self::Traffic),
            "industrial" | "industry" => Ok(Self::Industrial),
            "power" => Ok(Self::Power),
            "biomass" => Ok(Self::Biomass),
            "dust" => Ok(Self::Dust),
            _ => Err(SourceParseError(s.to_string())),
        }
    }
}

/// Ordered source → multiplier list
///
/// Multipliers are clamped into `[0, 1]` (1 = unchanged, 0 = eliminated).
/// Setting a source twice replaces the earlier value in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PolicyMultipliers(Vec<(EmissionSource, f64)>);

impl PolicyMultipliers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every source at 1.0
    #[must_use]
    pub fn no_op() -> Self {
        EmissionSource::ALL
            .into_iter()
            .fold(Self::new(), |m, source| m.with(source, 1.0))
    }

    /// Builder-style setter
    #[must_use]
    pub fn with(mut self, source: EmissionSource, multiplier: f64) -> Self {
        self.set(source, multiplier);
        self
    }

    pub fn set(&mut self, source: EmissionSource, multiplier: f64) {
        let multiplier = sanitize_multiplier(source, multiplier);
        match self.0.iter_mut().find(|(s, _)| *s == source) {
            Some(entry) => entry.1 = multiplier,
            None => self.0.push((source, multiplier)),
        }
    }

    /// Build from named pairs in iteration order. Unknown source names are
    /// ignored.
    pub fn from_named<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        pairs
            .into_iter()
            .fold(Self::new(), |m, (name, value)| match name.parse() {
                Ok(source) => m.with(source, value),
                Err(err) => {
                    debug!(%err, "Ignoring policy multiplier");
                    m
                }
            })
    }

    #[must_use]
    pub fn get(&self, source: EmissionSource) -> Option<f64> {
        self.0.iter().find(|(s, _)| *s == source).map(|(_, m)| *m)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EmissionSource, f64)> + '_ {
        self.0.iter().copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn sanitize_multiplier(source: EmissionSource, multiplier: f64) -> f64 {
    if !multiplier.is_finite() {
        warn!(%source, multiplier, "Non-finite multiplier treated as no reduction");
        return 1.0;
    }
    if !(0.0..=1.0).contains(&multiplier) {
        warn!(%source, multiplier, "Multiplier outside [0, 1], clamping");
    }
    multiplier.clamp(0.0, 1.0)
}

/// Single-shot simulation input, shaped like the `/simulate` request body
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SimulationRequest {
    #[serde(alias = "pollutants")]
    pub baseline: PollutantReading,
    /// Source name → multiplier, applied in the order the request lists them
    #[serde(default, with = "ordered_pairs")]
    pub multipliers: Vec<(String, f64)>,
}

/// A JSON object kept as a list of entries in document order
mod ordered_pairs {
    use serde::de::{MapAccess, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S>(pairs: &[(String, f64)], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(pairs.iter().map(|(name, value)| (name, value)))
    }

    struct PairsVisitor;

    impl<'de> Visitor<'de> for PairsVisitor {
        type Value = Vec<(String, f64)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of emission sources to multipliers")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut pairs = Vec::new();
            while let Some(entry) = map.next_entry::<String, f64>()? {
                pairs.push(entry);
            }
            Ok(pairs)
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<(String, f64)>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(PairsVisitor)
    }
}

impl SimulationRequest {
    #[must_use]
    pub fn multipliers(&self) -> PolicyMultipliers {
        PolicyMultipliers::from_named(self.multipliers.iter().map(|(k, v)| (k.as_str(), *v)))
    }

    #[must_use]
    pub fn run(&self) -> PolicyOutcome {
        simulate_policy(&self.baseline, &self.multipliers())
    }
}

/// Result of a policy simulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolicyOutcome {
    pub simulated_aqi: f64,
    pub original_aqi: f64,
    /// `(original - simulated) / original × 100`, or 0 when original is 0
    pub improvement_pct: f64,
    pub risk_level: RiskLevel,
    pub color: RiskColor,
    /// Baseline after all reductions were applied
    pub adjusted: PollutantReading,
}

/// Apply source reductions to a baseline reading
///
/// Only pollutants present in the baseline are touched.
#[must_use]
pub fn apply_reductions(
    baseline: &PollutantReading,
    multipliers: &PolicyMultipliers,
) -> PollutantReading {
    let mut adjusted = *baseline;
    for (source, multiplier) in multipliers.iter() {
        for &(pollutant, impact) in source.impacts() {
            adjusted.scale(pollutant, 1.0 - impact * (1.0 - multiplier));
        }
    }
    adjusted
}

/// Simulate the AQI after applying source reductions to `baseline`
#[must_use]
pub fn simulate_policy(baseline: &PollutantReading, multipliers: &PolicyMultipliers) -> PolicyOutcome {
    let adjusted = apply_reductions(baseline, multipliers);

    let simulated_aqi = compute_aqi(&adjusted).aqi.max(0.0);
    let original_aqi = compute_aqi(baseline).aqi;

    let improvement_pct = if original_aqi > 0.0 {
        (original_aqi - simulated_aqi) / original_aqi * 100.0
    } else {
        0.0
    };

    let (risk_level, color) = classify_risk(simulated_aqi);

    debug!(
        original_aqi,
        simulated_aqi,
        improvement_pct,
        "Policy simulation complete"
    );

    PolicyOutcome {
        simulated_aqi,
        original_aqi,
        improvement_pct,
        risk_level,
        color,
        adjusted,
    }
}
