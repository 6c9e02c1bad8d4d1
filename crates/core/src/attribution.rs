//! Heuristic pollution-source attribution
//!
//! Converts a reading into a percentage breakdown across five emission
//! categories using hand-tuned pollutant fingerprints:
//!
//! - Traffic: high NO2 and CO, moderate PM2.5
//! - Industrial: high SO2, elevated PM
//! - Dust/construction: PM10 high relative to PM2.5
//! - Biomass burning: high PM2.5, moderate CO
//! - Photochemical: high O3
//!
//! This is an explainability layer, not a trained classifier. The only hard
//! guarantees are determinism and integer percentages summing to exactly 100.

use crate::config::AttributionConfig;
use crate::core_types::{Pollutant, PollutantReading};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Emission source category used for attribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceCategory {
    Traffic,
    Industrial,
    Dust,
    Biomass,
    Photochemical,
}

impl SourceCategory {
    pub const ALL: [SourceCategory; 5] = [
        SourceCategory::Traffic,
        SourceCategory::Industrial,
        SourceCategory::Dust,
        SourceCategory::Biomass,
        SourceCategory::Photochemical,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Traffic => "traffic",
            Self::Industrial => "industrial",
            Self::Dust => "dust",
            Self::Biomass => "biomass",
            Self::Photochemical => "photochemical",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for SourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unnormalized fingerprint scores, one per category
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SignatureScores([f64; 5]);

impl SignatureScores {
    /// PM10/(PM2.5+1) above which coarse dust is assumed
    pub const DUST_RATIO_THRESHOLD: f64 = 1.5;
    /// Cap on the PM ratio's amplification of the dust score
    pub const DUST_RATIO_CAP: f64 = 3.0;

    /// Compute fingerprint scores. Absent pollutants count as zero.
    #[must_use]
    pub fn from_reading(reading: &PollutantReading) -> Self {
        let pm25 = reading.value_or_zero(Pollutant::Pm25);
        let pm10 = reading.value_or_zero(Pollutant::Pm10);
        let no2 = reading.value_or_zero(Pollutant::No2);
        let so2 = reading.value_or_zero(Pollutant::So2);
        let co = reading.value_or_zero(Pollutant::Co);
        let o3 = reading.value_or_zero(Pollutant::O3);

        let traffic = (no2 * 2.0 + co * 50.0 + pm25 * 0.3) / 3.0;
        let industrial = (so2 * 3.0 + pm25 * 0.5 + pm10 * 0.2) / 3.0;

        let pm_ratio = pm10 / (pm25 + 1.0);
        let dust = if pm_ratio > Self::DUST_RATIO_THRESHOLD {
            pm10 * 0.5 * pm_ratio.min(Self::DUST_RATIO_CAP)
        } else {
            pm10 * 0.1
        };

        let biomass = (pm25 * 0.8 + co * 30.0) / 2.0;
        let photochemical = o3 * 1.5;

        Self([traffic, industrial, dust, biomass, photochemical])
    }

    #[must_use]
    pub fn get(&self, category: SourceCategory) -> f64 {
        self.0[category.index()]
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }
}

/// Integer percentage per category, summing to exactly 100
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceAttribution {
    pub traffic: u32,
    pub industrial: u32,
    pub dust: u32,
    pub biomass: u32,
    pub photochemical: u32,
}

impl SourceAttribution {
    /// Distribution reported when the air is too clean to attribute
    pub const CLEAN_AIR_DEFAULT: SourceAttribution = SourceAttribution {
        traffic: 30,
        industrial: 20,
        dust: 25,
        biomass: 15,
        photochemical: 10,
    };

    fn from_array(values: [u32; 5]) -> Self {
        let [traffic, industrial, dust, biomass, photochemical] = values;
        Self {
            traffic,
            industrial,
            dust,
            biomass,
            photochemical,
        }
    }

    #[must_use]
    pub fn get(&self, category: SourceCategory) -> u32 {
        match category {
            SourceCategory::Traffic => self.traffic,
            SourceCategory::Industrial => self.industrial,
            SourceCategory::Dust => self.dust,
            SourceCategory::Biomass => self.biomass,
            SourceCategory::Photochemical => self.photochemical,
        }
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        SourceCategory::ALL.iter().map(|c| self.get(*c)).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SourceCategory, u32)> + '_ {
        SourceCategory::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    /// Category with the largest share (earliest category wins ties)
    #[must_use]
    pub fn dominant(&self) -> SourceCategory {
        self.iter()
            .fold((SourceCategory::Traffic, 0), |best, (c, v)| {
                if v > best.1 {
                    (c, v)
                } else {
                    best
                }
            })
            .0
    }
}

/// Turn rounded shares into percentages that sum to exactly 100
///
/// The signed residual goes to traffic. If that would push traffic below
/// zero, traffic stops at zero and the remaining deficit is taken one point
/// at a time from the largest other bucket.
fn balance(mut shares: [i64; 5]) -> [u32; 5] {
    let traffic = SourceCategory::Traffic.index();
    let residual = 100 - shares.iter().sum::<i64>();
    shares[traffic] += residual;

    let mut deficit = 0;
    if shares[traffic] < 0 {
        deficit = -shares[traffic];
        shares[traffic] = 0;
    }
    while deficit > 0 {
        let mut largest = traffic;
        for (i, share) in shares.iter().enumerate() {
            if i != traffic && (largest == traffic || *share > shares[largest]) {
                largest = i;
            }
        }
        shares[largest] -= 1;
        deficit -= 1;
    }

    shares.map(|s| s.max(0) as u32)
}

/// Attribute a reading using a specific configuration
#[must_use]
pub fn attribute_sources_with(
    reading: &PollutantReading,
    config: &AttributionConfig,
) -> SourceAttribution {
    let scores = SignatureScores::from_reading(reading);
    let total = scores.total();

    if !total.is_finite() || total < config.min_total_score {
        debug!(total, "Signature total below threshold, using clean-air distribution");
        return SourceAttribution::CLEAN_AIR_DEFAULT;
    }

    // Half-to-even rounding, residual absorbed by `balance`
    let shares = SourceCategory::ALL.map(|c| (scores.get(c) / total * 100.0).round_ties_even() as i64);
    SourceAttribution::from_array(balance(shares))
}

/// Attribute a reading to emission sources with the default configuration
#[must_use]
pub fn attribute_sources(reading: &PollutantReading) -> SourceAttribution {
    attribute_sources_with(reading, &AttributionConfig::default())
}
