//! Core types and utilities

pub mod pollutant;
pub mod risk;
pub mod units;

pub use pollutant::{Pollutant, PollutantParseError, PollutantReading};
pub use risk::{classify_risk, RiskColor, RiskLevel};
pub use units::*;
