//! Objective evaluation for HVAC setpoint schedule optimization.
//!
//! Decodes optimizer variables into setpoint schedules for a building
//! simulator and reduces the simulator's output table to energy, peak
//! power, comfort and setpoint-volatility objectives.

pub mod cli;
/// Thermal comfort models (PMV, SET*).
pub mod comfort;
pub mod config;
pub mod error;
/// Schedule codec, output table slicing and objective extraction.
pub mod eval;
pub mod io;
pub mod runner;
pub mod units;
