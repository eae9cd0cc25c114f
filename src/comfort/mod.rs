//! Thermal-comfort indices (PMV/PPD and SET*).
//!
//! Both models are pure functions of one set of instantaneous
//! environmental and personal inputs. Domain problems (negative humidity,
//! a fixed-point loop that fails to settle) are reported through
//! [`ComfortError`] so callers can branch on them; code that feeds a
//! numeric optimizer can collapse the result with
//! [`ComfortResultExt::or_nan`].

use serde::Deserialize;
use thiserror::Error;

pub mod pmv;
pub mod series;
pub mod set;

pub use pmv::{compute_pmv, ppd};
pub use series::{ComfortProfile, comfort_series, pmv_series};
pub use set::compute_set;

/// Metabolic rate of one met in W/m².
pub const MET_TO_W_PER_M2: f64 = 58.2;

/// Sea-level atmospheric pressure (kPa).
pub const STANDARD_PRESSURE_KPA: f64 = 101.325;

pub type ComfortResult<T> = Result<T, ComfortError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComfortError {
    #[error("invalid comfort input: {field} must be >= 0, got {value}")]
    InvalidInput { field: &'static str, value: f64 },

    #[error("{model} did not converge within {iterations} iterations")]
    NotConverged {
        model: &'static str,
        iterations: usize,
    },

    #[error("{model} iteration produced a non-finite value")]
    Diverged { model: &'static str },

    #[error("PMV {0} is outside [-5, 5]")]
    OutOfRange(f64),
}

/// Collapses a comfort result into the NaN-poisoned scalar an optimizer expects.
pub trait ComfortResultExt {
    fn or_nan(self) -> f64;
}

impl ComfortResultExt for ComfortResult<f64> {
    fn or_nan(self) -> f64 {
        self.unwrap_or(f64::NAN)
    }
}

/// Which comfort index to compute from raw climate data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComfortIndex {
    Pmv,
    Set,
}

/// Instantaneous inputs shared by the PMV and SET* models.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComfortInputs {
    /// Air temperature (°C).
    pub air_temp: f64,
    /// Relative humidity (%).
    pub relative_humidity: f64,
    /// Air velocity (m/s).
    pub air_velocity: f64,
    /// Mean radiant temperature (°C).
    pub radiant_temp: f64,
    /// Clothing insulation (clo).
    pub clothing: f64,
    /// Metabolic rate (met).
    pub metabolic_rate: f64,
    /// External work (W/m²).
    pub external_work: f64,
    /// Atmospheric pressure (kPa). Only used by SET*.
    pub pressure_kpa: f64,
}

impl ComfortInputs {
    /// Creates inputs with no external work at sea-level pressure.
    pub fn new(
        air_temp: f64,
        relative_humidity: f64,
        air_velocity: f64,
        radiant_temp: f64,
        clothing: f64,
        metabolic_rate: f64,
    ) -> Self {
        Self {
            air_temp,
            relative_humidity,
            air_velocity,
            radiant_temp,
            clothing,
            metabolic_rate,
            external_work: 0.0,
            pressure_kpa: STANDARD_PRESSURE_KPA,
        }
    }

    pub fn with_external_work(mut self, external_work: f64) -> Self {
        self.external_work = external_work;
        self
    }

    pub fn with_pressure(mut self, pressure_kpa: f64) -> Self {
        self.pressure_kpa = pressure_kpa;
        self
    }

    /// Rejects physically meaningless inputs.
    ///
    /// # Errors
    ///
    /// Returns `ComfortError::InvalidInput` naming the first negative field
    /// among humidity, air velocity, clothing and metabolic rate.
    pub fn validate(&self) -> ComfortResult<()> {
        let checks = [
            ("relative_humidity", self.relative_humidity),
            ("air_velocity", self.air_velocity),
            ("clothing", self.clothing),
            ("metabolic_rate", self.metabolic_rate),
        ];
        for (field, value) in checks {
            // NaN fails this comparison too
            if !(value >= 0.0) {
                return Err(ComfortError::InvalidInput { field, value });
            }
        }
        Ok(())
    }
}
