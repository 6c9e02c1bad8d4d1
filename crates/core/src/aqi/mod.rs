//! EPA breakpoint AQI computation

pub mod breakpoints;
mod calculator;

pub use breakpoints::{Breakpoint, BreakpointTable, TierLookup};
pub use calculator::{
    compute_aqi, max_sub_index, sub_index, sub_indices, AqiResult, AqiStatus, SubIndex,
};
