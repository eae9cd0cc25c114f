//! Comfort indices over temperature/humidity time series.

use serde::Deserialize;
use tracing::warn;

use super::{ComfortIndex, ComfortInputs, ComfortResultExt, compute_pmv, compute_set};

/// Occupant and air-movement assumptions held fixed over a series.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComfortProfile {
    /// Air velocity (m/s).
    pub air_velocity: f64,
    /// Clothing insulation (clo).
    pub clothing: f64,
    /// Metabolic rate (met).
    pub metabolic_rate: f64,
    /// Mean radiant temperature relative to air temperature (°C).
    pub radiant_offset: f64,
}

impl Default for ComfortProfile {
    fn default() -> Self {
        Self {
            air_velocity: 0.1,
            clothing: 0.5,
            metabolic_rate: 1.2,
            radiant_offset: 1.0,
        }
    }
}

impl ComfortProfile {
    /// Builds model inputs for one temperature/humidity sample.
    pub fn inputs(&self, air_temp: f64, relative_humidity: f64) -> ComfortInputs {
        ComfortInputs::new(
            air_temp,
            relative_humidity,
            self.air_velocity,
            air_temp + self.radiant_offset,
            self.clothing,
            self.metabolic_rate,
        )
    }
}

/// Computes a comfort index for each paired temperature/humidity sample.
///
/// Samples whose model fails are reported as NaN and logged; the series
/// keeps the length of the shorter input.
pub fn comfort_series(
    index: ComfortIndex,
    temperatures: &[f64],
    humidities: &[f64],
    profile: &ComfortProfile,
) -> Vec<f64> {
    temperatures
        .iter()
        .zip(humidities)
        .enumerate()
        .map(|(t, (&ta, &rh))| {
            let inputs = profile.inputs(ta, rh);
            let result = match index {
                ComfortIndex::Pmv => compute_pmv(&inputs),
                ComfortIndex::Set => compute_set(&inputs),
            };
            if let Err(e) = &result {
                warn!(timestep = t, air_temp = ta, humidity = rh, "{e}");
            }
            result.or_nan()
        })
        .collect()
}

/// PMV for each temperature/humidity sample.
pub fn pmv_series(temperatures: &[f64], humidities: &[f64], profile: &ComfortProfile) -> Vec<f64> {
    comfort_series(ComfortIndex::Pmv, temperatures, humidities, profile)
}
