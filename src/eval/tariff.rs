//! Electricity charges for a demand-metered commercial tariff.

use serde::Deserialize;

/// Tariff rates.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Tariff {
    /// Monthly basic charge per kW of contracted (peak) power.
    pub basic_rate_unit: f64,
    /// Charge per kWh consumed.
    pub energy_rate_unit: f64,
    /// Power factor (0-1); 0.85 is the neutral point of the discount.
    pub power_factor: f64,
}

impl Default for Tariff {
    fn default() -> Self {
        Self {
            basic_rate_unit: 1684.8,
            energy_rate_unit: 17.22,
            power_factor: 0.9,
        }
    }
}

impl Tariff {
    /// Monthly basic charge for a peak demand (kW).
    pub fn basic_charge(&self, peak_power_kw: f64) -> f64 {
        basic_charge(peak_power_kw, self.basic_rate_unit, self.power_factor)
    }

    /// Energy charge for consumption (kWh).
    pub fn energy_charge(&self, energy_kwh: f64) -> f64 {
        energy_charge(energy_kwh, self.energy_rate_unit)
    }
}

/// `peak * rate_unit * (185 - power_factor * 100) / 100`
pub fn basic_charge(peak_power_kw: f64, rate_unit: f64, power_factor: f64) -> f64 {
    peak_power_kw * rate_unit * (185.0 - power_factor * 100.0) / 100.0
}

pub fn energy_charge(energy_kwh: f64, unit_price: f64) -> f64 {
    energy_kwh * unit_price
}
