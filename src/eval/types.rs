//! Extractor configuration: column layout, windows and tariff.

use serde::Deserialize;

use super::table::Window;
use super::tariff::Tariff;
use crate::comfort::ComfortProfile;

/// Temperature/humidity column pair of one zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ZoneColumns {
    pub temperature: usize,
    pub humidity: usize,
}

/// Where each channel lives in the simulator output table.
///
/// The defaults follow the pick-up table layout: time, outdoor temperature
/// and humidity, applied setpoint, three zone temperature/humidity pairs,
/// three zone PMVs, electric energy and cooling energy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnMap {
    /// PMV channels averaged for comfort objectives.
    pub pmv: Vec<usize>,
    /// Electric energy per timestep (J).
    pub electric_energy: Vec<usize>,
    /// Cooling energy per timestep (J).
    pub cooling_energy: Vec<usize>,
    /// Applied setpoint (°C).
    pub setpoint: Vec<usize>,
    /// Raw zone climate used when comfort is computed rather than read.
    pub zones: Vec<ZoneColumns>,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            pmv: vec![11],
            electric_energy: vec![13],
            cooling_energy: vec![14],
            setpoint: vec![3],
            zones: vec![
                ZoneColumns {
                    temperature: 4,
                    humidity: 5,
                },
                ZoneColumns {
                    temperature: 6,
                    humidity: 7,
                },
                ZoneColumns {
                    temperature: 8,
                    humidity: 9,
                },
            ],
        }
    }
}

impl ColumnMap {
    /// Channels summed row-wise for peak power: electric then cooling.
    pub fn peak_power(&self) -> Vec<usize> {
        self.electric_energy
            .iter()
            .chain(&self.cooling_energy)
            .copied()
            .collect()
    }

    /// Largest column index referenced, if any.
    pub fn max_index(&self) -> Option<usize> {
        self.pmv
            .iter()
            .chain(&self.electric_energy)
            .chain(&self.cooling_energy)
            .chain(&self.setpoint)
            .copied()
            .chain(self.zones.iter().flat_map(|z| [z.temperature, z.humidity]))
            .max()
    }
}

/// Row windows per objective category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationWindows {
    pub comfort: Window,
    pub energy: Window,
    pub setpoint: Window,
}

impl EvaluationWindows {
    /// Comfort 7:00-21:00, energy over the whole day, setpoint from 6:00.
    pub fn office_day(timesteps_per_hour: usize) -> Self {
        Self {
            comfort: Window::from_hours(7, 21, timesteps_per_hour),
            energy: Window::from_hours(0, 24, timesteps_per_hour),
            setpoint: Window::new(
                6 * timesteps_per_hour,
                (24 * timesteps_per_hour).saturating_sub(1),
            ),
        }
    }
}

/// Everything the objective extractor needs besides the table.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractorConfig {
    /// Simulator output rows per hour.
    pub timesteps_per_hour: usize,
    pub columns: ColumnMap,
    pub windows: EvaluationWindows,
    pub tariff: Tariff,
    /// Setpoint change per timestep tolerated before it counts as a violation (°C).
    pub max_setpoint_step: f64,
    /// Occupant assumptions for comfort computed from raw zone climate.
    pub comfort: ComfortProfile,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            timesteps_per_hour: 6,
            columns: ColumnMap::default(),
            windows: EvaluationWindows::office_day(6),
            tariff: Tariff::default(),
            max_setpoint_step: 2.0,
            comfort: ComfortProfile::default(),
        }
    }
}

impl ExtractorConfig {
    /// Sampling period of one table row in hours.
    pub fn sampling_period_hours(&self) -> f64 {
        1.0 / self.timesteps_per_hour as f64
    }
}
