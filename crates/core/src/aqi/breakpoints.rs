//! EPA breakpoint tables
//!
//! Each table is an ordered list of non-overlapping tiers mapping a
//! concentration range linearly onto an AQI sub-range:
//!
//! I = I_lo + (I_hi - I_lo) × (C - C_lo) / (C_hi - C_lo)
//!
//! Tables are expressed in the units the EPA publishes them in (µg/m³ for
//! particulates, ppb for O3/NO2/SO2, ppm for CO). Readings are converted with
//! fixed approximations before lookup, see [`lookup_concentration`].
//!
//! # References
//! - EPA (2018). "Technical Assistance Document for the Reporting of Daily Air
//!   Quality – the Air Quality Index (AQI)", EPA 454/B-18-007

use crate::core_types::{Pollutant, PollutantReading};

/// µg/m³ per ppb of ozone (25 °C, 1 atm, rounded)
pub const OZONE_UG_PER_PPB: f64 = 2.0;

/// µg/m³ per ppb of nitrogen dioxide (25 °C, 1 atm)
pub const NO2_UG_PER_PPB: f64 = 1.88;

/// One tier of a breakpoint table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakpoint {
    pub conc_low: f64,
    pub conc_high: f64,
    pub index_low: f64,
    pub index_high: f64,
}

impl Breakpoint {
    const fn new(conc_low: f64, conc_high: f64, index_low: f64, index_high: f64) -> Self {
        Self {
            conc_low,
            conc_high,
            index_low,
            index_high,
        }
    }

    /// AQI units per concentration unit across this tier
    #[must_use]
    pub fn slope(&self) -> f64 {
        (self.index_high - self.index_low) / (self.conc_high - self.conc_low)
    }

    /// Whether `concentration` lies inside `[conc_low, conc_high]`
    #[must_use]
    pub fn contains(&self, concentration: f64) -> bool {
        (self.conc_low..=self.conc_high).contains(&concentration)
    }

    /// Linear interpolation inside (or extrapolation beyond) this tier
    ///
    /// Evaluated through the fractional position so both tier ends map
    /// exactly onto `index_low` and `index_high`.
    #[must_use]
    pub fn interpolate(&self, concentration: f64) -> f64 {
        let position = (concentration - self.conc_low) / (self.conc_high - self.conc_low);
        self.index_low + (self.index_high - self.index_low) * position
    }
}

/// Result of a single table lookup
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierLookup {
    /// Sub-index value
    pub index: f64,
    /// True when the concentration was above the top tier
    pub extrapolated: bool,
}

/// Breakpoint table for one pollutant
#[derive(Debug)]
pub struct BreakpointTable {
    pollutant: Pollutant,
    unit: &'static str,
    tiers: &'static [Breakpoint],
}

const PM25_TIERS: [Breakpoint; 7] = [
    Breakpoint::new(0.0, 12.0, 0.0, 50.0),      // Good
    Breakpoint::new(12.1, 35.4, 51.0, 100.0),   // Moderate
    Breakpoint::new(35.5, 55.4, 101.0, 150.0),  // Unhealthy for Sensitive Groups
    Breakpoint::new(55.5, 150.4, 151.0, 200.0), // Unhealthy
    Breakpoint::new(150.5, 250.4, 201.0, 300.0), // Very Unhealthy
    Breakpoint::new(250.5, 350.4, 301.0, 400.0), // Hazardous
    Breakpoint::new(350.5, 500.4, 401.0, 500.0), // Hazardous
];

const PM10_TIERS: [Breakpoint; 7] = [
    Breakpoint::new(0.0, 54.0, 0.0, 50.0),
    Breakpoint::new(55.0, 154.0, 51.0, 100.0),
    Breakpoint::new(155.0, 254.0, 101.0, 150.0),
    Breakpoint::new(255.0, 354.0, 151.0, 200.0),
    Breakpoint::new(355.0, 424.0, 201.0, 300.0),
    Breakpoint::new(425.0, 504.0, 301.0, 400.0),
    Breakpoint::new(505.0, 604.0, 401.0, 500.0),
];

// 8-hour tiers, continued with the 1-hour range above 200 ppb
const O3_TIERS: [Breakpoint; 6] = [
    Breakpoint::new(0.0, 54.0, 0.0, 50.0),
    Breakpoint::new(55.0, 70.0, 51.0, 100.0),
    Breakpoint::new(71.0, 85.0, 101.0, 150.0),
    Breakpoint::new(86.0, 105.0, 151.0, 200.0),
    Breakpoint::new(106.0, 200.0, 201.0, 300.0),
    Breakpoint::new(201.0, 504.0, 301.0, 500.0),
];

const NO2_TIERS: [Breakpoint; 7] = [
    Breakpoint::new(0.0, 53.0, 0.0, 50.0),
    Breakpoint::new(54.0, 100.0, 51.0, 100.0),
    Breakpoint::new(101.0, 360.0, 101.0, 150.0),
    Breakpoint::new(361.0, 649.0, 151.0, 200.0),
    Breakpoint::new(650.0, 1249.0, 201.0, 300.0),
    Breakpoint::new(1250.0, 1649.0, 301.0, 400.0),
    Breakpoint::new(1650.0, 2049.0, 401.0, 500.0),
];

const SO2_TIERS: [Breakpoint; 7] = [
    Breakpoint::new(0.0, 35.0, 0.0, 50.0),
    Breakpoint::new(36.0, 75.0, 51.0, 100.0),
    Breakpoint::new(76.0, 185.0, 101.0, 150.0),
    Breakpoint::new(186.0, 304.0, 151.0, 200.0),
    Breakpoint::new(305.0, 604.0, 201.0, 300.0),
    Breakpoint::new(605.0, 804.0, 301.0, 400.0),
    Breakpoint::new(805.0, 1004.0, 401.0, 500.0),
];

const CO_TIERS: [Breakpoint; 7] = [
    Breakpoint::new(0.0, 4.4, 0.0, 50.0),
    Breakpoint::new(4.5, 9.4, 51.0, 100.0),
    Breakpoint::new(9.5, 12.4, 101.0, 150.0),
    Breakpoint::new(12.5, 15.4, 151.0, 200.0),
    Breakpoint::new(15.5, 30.4, 201.0, 300.0),
    Breakpoint::new(30.5, 40.4, 301.0, 400.0),
    Breakpoint::new(40.5, 50.4, 401.0, 500.0),
];

static PM25_TABLE: BreakpointTable = BreakpointTable::new(Pollutant::Pm25, "µg/m³", &PM25_TIERS);
static PM10_TABLE: BreakpointTable = BreakpointTable::new(Pollutant::Pm10, "µg/m³", &PM10_TIERS);
static O3_TABLE: BreakpointTable = BreakpointTable::new(Pollutant::O3, "ppb", &O3_TIERS);
static NO2_TABLE: BreakpointTable = BreakpointTable::new(Pollutant::No2, "ppb", &NO2_TIERS);
static SO2_TABLE: BreakpointTable = BreakpointTable::new(Pollutant::So2, "ppb", &SO2_TIERS);
static CO_TABLE: BreakpointTable = BreakpointTable::new(Pollutant::Co, "ppm", &CO_TIERS);

impl BreakpointTable {
    const fn new(pollutant: Pollutant, unit: &'static str, tiers: &'static [Breakpoint]) -> Self {
        Self {
            pollutant,
            unit,
            tiers,
        }
    }

    /// Table for a pollutant
    #[must_use]
    pub fn for_pollutant(pollutant: Pollutant) -> &'static BreakpointTable {
        match pollutant {
            Pollutant::Pm25 => &PM25_TABLE,
            Pollutant::Pm10 => &PM10_TABLE,
            Pollutant::No2 => &NO2_TABLE,
            Pollutant::So2 => &SO2_TABLE,
            Pollutant::Co => &CO_TABLE,
            Pollutant::O3 => &O3_TABLE,
        }
    }

    #[must_use]
    pub fn pollutant(&self) -> Pollutant {
        self.pollutant
    }

    /// Unit the tier boundaries are expressed in
    #[must_use]
    pub fn unit(&self) -> &'static str {
        self.unit
    }

    #[must_use]
    pub fn tiers(&self) -> &'static [Breakpoint] {
        self.tiers
    }

    /// Map a (unit-converted) concentration onto its sub-index
    ///
    /// - Inside a tier: linear interpolation.
    /// - In the gap between two tiers (e.g. PM2.5 12.05): the lower tier's
    ///   `index_high`, which keeps the mapping monotone.
    /// - Above the top tier: extrapolation with the top tier's slope.
    #[must_use]
    pub fn lookup(&self, concentration: f64) -> TierLookup {
        let concentration = concentration.max(0.0);
        let mut previous: Option<&Breakpoint> = None;

        for tier in self.tiers {
            if concentration <= tier.conc_high {
                let index = if tier.contains(concentration) {
                    tier.interpolate(concentration)
                } else {
                    previous.map_or(tier.index_low, |p| p.index_high)
                };
                return TierLookup {
                    index,
                    extrapolated: false,
                };
            }
            previous = Some(tier);
        }

        // Above every tier: keep rising with the top tier's slope
        let index = previous.map_or(0.0, |top| top.interpolate(concentration));
        TierLookup {
            index,
            extrapolated: true,
        }
    }
}

/// Concentration of `pollutant` in its table's units, if reported
///
/// O3 and NO2 are converted from µg/m³ to ppb with fixed factors. SO2 is
/// looked up as reported and CO (mg/m³) is looked up against the ppm tiers,
/// both as fixed approximations.
#[must_use]
pub fn lookup_concentration(reading: &PollutantReading, pollutant: Pollutant) -> Option<f64> {
    match pollutant {
        Pollutant::Pm25 => reading.pm2_5.map(f64::from),
        Pollutant::Pm10 => reading.pm10.map(f64::from),
        Pollutant::So2 => reading.so2.map(f64::from),
        Pollutant::Co => reading.co.map(f64::from),
        Pollutant::O3 => reading.o3.map(|c| c.to_ppb(OZONE_UG_PER_PPB).value()),
        Pollutant::No2 => reading.no2.map(|c| c.to_ppb(NO2_UG_PER_PPB).value()),
    }
}
