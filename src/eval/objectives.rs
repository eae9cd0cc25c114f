//! Objective extraction from simulator output.

use std::fmt;

use serde::Serialize;

use super::table::OutputTable;
use super::types::ExtractorConfig;
use crate::comfort::{ComfortIndex, comfort_series};
use crate::error::{EvalError, EvalResult};
use crate::units::{energy_to_power_kw, j_to_kwh};

/// Read-only view that turns one output table into scalar objectives.
///
/// Every method is a pure read; rows or columns that fall outside the
/// table are reported as errors rather than substituted.
#[derive(Debug, Clone, Copy)]
pub struct ObjectiveExtractor<'a> {
    table: &'a OutputTable,
    config: &'a ExtractorConfig,
}

impl<'a> ObjectiveExtractor<'a> {
    pub fn new(table: &'a OutputTable, config: &'a ExtractorConfig) -> Self {
        Self { table, config }
    }

    /// Electric-energy columns over the energy window.
    ///
    /// # Errors
    ///
    /// Out-of-range rows/columns, or no electric columns configured.
    pub fn electric_energy_data(&self) -> EvalResult<Vec<Vec<f64>>> {
        let columns = non_empty(&self.config.columns.electric_energy, "electric energy")?;
        self.table.slice(self.config.windows.energy, columns)
    }

    /// PMV columns over the comfort window.
    ///
    /// # Errors
    ///
    /// Out-of-range rows/columns, or no PMV columns configured.
    pub fn pmv_data(&self) -> EvalResult<Vec<Vec<f64>>> {
        let columns = non_empty(&self.config.columns.pmv, "PMV")?;
        self.table.slice(self.config.windows.comfort, columns)
    }

    /// Setpoint columns over the setpoint window.
    ///
    /// # Errors
    ///
    /// Out-of-range rows/columns, or no setpoint columns configured.
    pub fn setpoint_data(&self) -> EvalResult<Vec<Vec<f64>>> {
        let columns = non_empty(&self.config.columns.setpoint, "setpoint")?;
        self.table.slice(self.config.windows.setpoint, columns)
    }

    /// Total electric energy over the energy window (J).
    ///
    /// # Errors
    ///
    /// See [`ObjectiveExtractor::electric_energy_data`].
    pub fn total_energy(&self) -> EvalResult<f64> {
        Ok(self.electric_energy_data()?.iter().flatten().sum())
    }

    /// Total electric energy over the energy window (kWh).
    ///
    /// # Errors
    ///
    /// See [`ObjectiveExtractor::electric_energy_data`].
    pub fn total_energy_kwh(&self) -> EvalResult<f64> {
        Ok(j_to_kwh(self.total_energy()?))
    }

    /// Highest mean power of any timestep in the energy window (kW).
    ///
    /// Electric and cooling energy are summed per row before conversion.
    /// A NaN row makes the peak NaN.
    ///
    /// # Errors
    ///
    /// Out-of-range rows/columns, or no energy columns configured.
    pub fn peak_power(&self) -> EvalResult<f64> {
        let columns = self.config.columns.peak_power();
        let columns = non_empty(&columns, "energy")?;
        let period = self.config.sampling_period_hours();
        let per_row = self.table.row_sums(self.config.windows.energy, columns)?;
        Ok(per_row
            .into_iter()
            .map(|joules| energy_to_power_kw(joules, period))
            .fold(f64::NEG_INFINITY, |peak, kw| {
                if peak.is_nan() || kw.is_nan() {
                    f64::NAN
                } else {
                    peak.max(kw)
                }
            }))
    }

    /// Mean PMV over the comfort window and all PMV columns.
    ///
    /// # Errors
    ///
    /// See [`ObjectiveExtractor::pmv_data`].
    pub fn average_pmv(&self) -> EvalResult<f64> {
        Ok(mean(self.pmv_data()?.iter().flatten().copied()))
    }

    /// Mean |PMV| over the comfort window.
    ///
    /// # Errors
    ///
    /// See [`ObjectiveExtractor::pmv_data`].
    pub fn average_abs_pmv(&self) -> EvalResult<f64> {
        Ok(mean(self.pmv_data()?.iter().flatten().map(|p| p.abs())))
    }

    /// `(min, max)` PMV over the comfort window.
    ///
    /// # Errors
    ///
    /// See [`ObjectiveExtractor::pmv_data`].
    pub fn peak_pmv(&self) -> EvalResult<(f64, f64)> {
        Ok(self
            .pmv_data()?
            .iter()
            .flatten()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &p| {
                (lo.min(p), hi.max(p))
            }))
    }

    /// Comfort-band violations: sum of `round(|pmv|)` over the comfort window.
    ///
    /// A sample within ±0.5 contributes nothing; larger excursions
    /// contribute their rounded magnitude.
    ///
    /// # Errors
    ///
    /// See [`ObjectiveExtractor::pmv_data`].
    pub fn pmv_violation_count(&self) -> EvalResult<f64> {
        Ok(self
            .pmv_data()?
            .iter()
            .flatten()
            .map(|p| p.abs().round())
            .sum())
    }

    /// Rate-limit excess of the applied setpoint trace.
    ///
    /// For each setpoint column, sums `|Δ| - max_step` over consecutive rows
    /// whose change exceeds `max_step`.
    ///
    /// # Errors
    ///
    /// See [`ObjectiveExtractor::setpoint_data`].
    pub fn setpoint_violation(&self) -> EvalResult<f64> {
        let data = self.setpoint_data()?;
        let limit = self.config.max_setpoint_step;
        Ok(data
            .windows(2)
            .flat_map(|pair| pair[0].iter().zip(&pair[1]).map(|(a, b)| (b - a).abs()))
            .filter(|change| *change > limit)
            .map(|change| change - limit)
            .sum())
    }

    /// Mean cooling-to-electric energy ratio over the energy window.
    ///
    /// Rows with no electric consumption are skipped.
    ///
    /// # Errors
    ///
    /// Out-of-range access, missing columns, or `EmptyInput` if no row consumed power.
    pub fn average_cop(&self) -> EvalResult<f64> {
        let window = self.config.windows.energy;
        let columns = &self.config.columns;
        let cooling = self
            .table
            .row_sums(window, non_empty(&columns.cooling_energy, "cooling energy")?)?;
        let electric = self
            .table
            .row_sums(window, non_empty(&columns.electric_energy, "electric energy")?)?;
        let ratios: Vec<f64> = cooling
            .iter()
            .zip(&electric)
            .filter(|(_, e)| **e > 0.0)
            .map(|(c, e)| c / e)
            .collect();
        if ratios.is_empty() {
            return Err(EvalError::EmptyInput("COP window".to_string()));
        }
        Ok(mean(ratios.into_iter()))
    }

    /// Comfort index computed from each zone's temperature/humidity columns
    /// over the comfort window, one series per zone.
    ///
    /// # Errors
    ///
    /// Out-of-range rows/columns, or no zones configured.
    pub fn computed_zone_comfort(&self, index: ComfortIndex) -> EvalResult<Vec<Vec<f64>>> {
        let zones = &self.config.columns.zones;
        if zones.is_empty() {
            return Err(EvalError::NoColumns("zone climate"));
        }
        let window = self.config.windows.comfort;
        zones
            .iter()
            .map(|zone| {
                let temps = self.table.column(zone.temperature, window)?;
                let hums = self.table.column(zone.humidity, window)?;
                Ok(comfort_series(index, &temps, &hums, &self.config.comfort))
            })
            .collect()
    }

    /// Monthly basic charge from the peak power.
    ///
    /// # Errors
    ///
    /// See [`ObjectiveExtractor::peak_power`].
    pub fn basic_charge(&self) -> EvalResult<f64> {
        Ok(self.config.tariff.basic_charge(self.peak_power()?))
    }

    /// Energy charge from the total consumption.
    ///
    /// # Errors
    ///
    /// See [`ObjectiveExtractor::total_energy`].
    pub fn energy_charge(&self) -> EvalResult<f64> {
        Ok(self.config.tariff.energy_charge(self.total_energy_kwh()?))
    }

    /// Computes every objective in one pass over the configuration.
    ///
    /// # Errors
    ///
    /// The first extraction error encountered.
    pub fn report(&self) -> EvalResult<ObjectiveReport> {
        let total_energy_j = self.total_energy()?;
        let peak_power_kw = self.peak_power()?;
        Ok(ObjectiveReport {
            total_energy_j,
            total_energy_kwh: j_to_kwh(total_energy_j),
            peak_power_kw,
            average_pmv: self.average_pmv()?,
            pmv_violation_count: self.pmv_violation_count()?,
            setpoint_violation: self.setpoint_violation()?,
            basic_charge: self.config.tariff.basic_charge(peak_power_kw),
            energy_charge: self.config.tariff.energy_charge(j_to_kwh(total_energy_j)),
        })
    }
}

/// Scalar objectives for one evaluated candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectiveReport {
    /// Electric energy over the energy window (J).
    pub total_energy_j: f64,
    /// Same total in kWh.
    pub total_energy_kwh: f64,
    /// Peak mean power of a single timestep (kW).
    pub peak_power_kw: f64,
    /// Mean PMV over the comfort window.
    pub average_pmv: f64,
    /// Sum of rounded |PMV| over the comfort window.
    pub pmv_violation_count: f64,
    /// Setpoint rate-limit excess (°C).
    pub setpoint_violation: f64,
    /// Monthly basic charge.
    pub basic_charge: f64,
    /// Energy charge.
    pub energy_charge: f64,
}

impl ObjectiveReport {
    /// Column names in [`ObjectiveReport::values`] order.
    pub const FIELDS: [&'static str; 8] = [
        "total_energy_j",
        "total_energy_kwh",
        "peak_power_kw",
        "average_pmv",
        "pmv_violation_count",
        "setpoint_violation",
        "basic_charge",
        "energy_charge",
    ];

    pub fn values(&self) -> [f64; 8] {
        [
            self.total_energy_j,
            self.total_energy_kwh,
            self.peak_power_kw,
            self.average_pmv,
            self.pmv_violation_count,
            self.setpoint_violation,
            self.basic_charge,
            self.energy_charge,
        ]
    }

    /// True when any objective is NaN or infinite.
    pub fn has_non_finite(&self) -> bool {
        self.values().iter().any(|v| !v.is_finite())
    }
}

impl fmt::Display for ObjectiveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Objective Report ---")?;
        writeln!(
            f,
            "Total energy:          {:.0} J ({:.3} kWh)",
            self.total_energy_j, self.total_energy_kwh
        )?;
        writeln!(f, "Peak power:            {:.3} kW", self.peak_power_kw)?;
        writeln!(f, "Average PMV:           {:.3}", self.average_pmv)?;
        writeln!(f, "PMV violations:        {:.0}", self.pmv_violation_count)?;
        writeln!(f, "Setpoint violation:    {:.2} °C", self.setpoint_violation)?;
        writeln!(f, "Basic charge:          {:.2}", self.basic_charge)?;
        write!(f, "Energy charge:         {:.2}", self.energy_charge)
    }
}

fn non_empty<'c>(columns: &'c [usize], what: &'static str) -> EvalResult<&'c [usize]> {
    if columns.is_empty() {
        Err(EvalError::NoColumns(what))
    } else {
        Ok(columns)
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    sum / n as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::table::Window;
    use crate::eval::types::{ColumnMap, EvaluationWindows};
    use approx::assert_relative_eq;

    /// Five-column table: setpoint, pmv, electric, cooling, spare.
    fn config(rows: usize) -> ExtractorConfig {
        let last = rows - 1;
        ExtractorConfig {
            columns: ColumnMap {
                setpoint: vec![0],
                pmv: vec![1],
                electric_energy: vec![2],
                cooling_energy: vec![3],
                zones: Vec::new(),
            },
            windows: EvaluationWindows {
                comfort: Window::new(0, last),
                energy: Window::new(0, last),
                setpoint: Window::new(0, last),
            },
            ..ExtractorConfig::default()
        }
    }

    fn table(rows: &[[f64; 5]]) -> OutputTable {
        OutputTable::from_rows(rows.iter().map(|r| r.to_vec()).collect()).unwrap()
    }

    #[test]
    fn corrupt_energy_row_poisons_peak_power() {
        let rows = [
            [24.0, 0.0, 1000.0, 0.0, 0.0],
            [24.0, 0.0, f64::NAN, 0.0, 0.0],
            [24.0, 0.0, 5000.0, 0.0, 0.0],
        ];
        let t = table(&rows);
        let cfg = config(3);
        let ex = ObjectiveExtractor::new(&t, &cfg);
        assert!(ex.peak_power().unwrap().is_nan());
        assert!(ex.total_energy().unwrap().is_nan());
    }

    #[test]
    fn pmv_within_half_band_is_not_a_violation() {
        let rows: Vec<[f64; 5]> = (0..10)
            .map(|i| [24.0, if i % 2 == 0 { 0.4 } else { -0.4 }, 0.0, 0.0, 0.0])
            .collect();
        let t = table(&rows);
        let cfg = config(10);
        assert_eq!(ObjectiveExtractor::new(&t, &cfg).pmv_violation_count().unwrap(), 0.0);
    }

    #[test]
    fn pmv_beyond_half_band_counts_once_per_row() {
        let rows: Vec<[f64; 5]> = (0..10)
            .map(|i| [24.0, if i % 2 == 0 { 0.6 } else { -0.6 }, 0.0, 0.0, 0.0])
            .collect();
        let t = table(&rows);
        let cfg = config(10);
        let ex = ObjectiveExtractor::new(&t, &cfg);
        assert_eq!(ex.pmv_violation_count().unwrap(), 10.0);
        assert_relative_eq!(ex.average_pmv().unwrap(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(ex.average_abs_pmv().unwrap(), 0.6, epsilon = 1e-12);
        assert_eq!(ex.peak_pmv().unwrap(), (-0.6, 0.6));
    }

    #[test]
    fn setpoint_jump_excess_is_summed() {
        let t = table(&[
            [24.0, 0.0, 0.0, 0.0, 0.0],
            [27.0, 0.0, 0.0, 0.0, 0.0],
            [25.0, 0.0, 0.0, 0.0, 0.0],
        ]);
        let cfg = config(3);
        // +3.0 contributes 1.0, -2.0 contributes nothing
        assert_relative_eq!(
            ObjectiveExtractor::new(&t, &cfg).setpoint_violation().unwrap(),
            1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn peak_power_includes_cooling() {
        let t = table(&[
            [24.0, 0.0, 1000.0, 0.0, 0.0],
            [24.0, 0.0, 1000.0, 2000.0, 0.0],
        ]);
        let cfg = config(2);
        let peak = ObjectiveExtractor::new(&t, &cfg).peak_power().unwrap();
        assert_relative_eq!(peak, 3000.0 / 3_600_000.0 * 6.0, epsilon = 1e-12);
    }

    #[test]
    fn cop_skips_idle_rows() {
        let t = table(&[
            [24.0, 0.0, 100.0, 300.0, 0.0],
            [24.0, 0.0, 0.0, 0.0, 0.0],
            [24.0, 0.0, 100.0, 500.0, 0.0],
        ]);
        let cfg = config(3);
        assert_relative_eq!(
            ObjectiveExtractor::new(&t, &cfg).average_cop().unwrap(),
            4.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn missing_columns_are_reported() {
        let t = table(&[[24.0, 0.0, 0.0, 0.0, 0.0]]);
        let mut cfg = config(1);
        cfg.columns.pmv.clear();
        assert!(matches!(
            ObjectiveExtractor::new(&t, &cfg).average_pmv(),
            Err(EvalError::NoColumns("PMV"))
        ));
        assert!(matches!(
            ObjectiveExtractor::new(&t, &cfg).computed_zone_comfort(ComfortIndex::Pmv),
            Err(EvalError::NoColumns("zone climate"))
        ));
    }

    #[test]
    fn report_display_does_not_panic() {
        let t = table(&[[24.0, 0.2, 1000.0, 500.0, 0.0], [24.5, 0.3, 1200.0, 600.0, 0.0]]);
        let cfg = config(2);
        let report = ObjectiveExtractor::new(&t, &cfg).report().unwrap();
        assert!(!report.has_non_finite());
        let s = format!("{report}");
        assert!(s.contains("Peak power"));
    }
}
