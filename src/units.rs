//! Unit conversions used when turning simulator output into objectives.

const JOULES_PER_KWH: f64 = 3_600.0 * 1_000.0;

/// Joules to kilowatt-hours.
pub fn j_to_kwh(joules: f64) -> f64 {
    joules / JOULES_PER_KWH
}

/// Kilowatt-hours to joules.
pub fn kwh_to_j(kwh: f64) -> f64 {
    kwh * JOULES_PER_KWH
}

/// Converts an energy amount over one sampling period into mean power.
///
/// # Arguments
///
/// * `joules` - Energy accumulated during the period (J)
/// * `period_hours` - Length of the period (h)
///
/// # Returns
///
/// Average power over the period in kW.
pub fn energy_to_power_kw(joules: f64, period_hours: f64) -> f64 {
    j_to_kwh(joules) / period_hours
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}
