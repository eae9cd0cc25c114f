//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use setpoint_eval::config::EvaluationConfig;
use setpoint_eval::eval::{ExtractorConfig, OutputTable};
use setpoint_eval::runner::Evaluation;

/// Rows in one simulated day at 10-minute resolution.
pub const DAY_ROWS: usize = 144;

/// Columns in the default pick-up table layout.
pub const COLUMNS: usize = 15;

/// Pipeline built from the office preset.
pub fn office_evaluation() -> Evaluation {
    Evaluation::from_config(&EvaluationConfig::office()).expect("office preset is valid")
}

/// Extractor configuration of the office preset.
pub fn office_extractor() -> ExtractorConfig {
    EvaluationConfig::office().to_extractor_config()
}

/// One row of the default layout.
///
/// Column layout: 0 time, 1-2 outdoor temperature/humidity, 3 setpoint,
/// 4-9 zone temperature/humidity pairs, 10-12 zone PMV, 13 electric
/// energy, 14 cooling energy.
#[derive(Debug, Clone, Copy)]
pub struct DayRow {
    pub setpoint: f64,
    pub zone_temp: f64,
    pub zone_humidity: f64,
    pub pmv: f64,
    pub electric_j: f64,
    pub cooling_j: f64,
}

impl Default for DayRow {
    fn default() -> Self {
        Self {
            setpoint: 25.0,
            zone_temp: 25.0,
            zone_humidity: 50.0,
            pmv: 0.0,
            electric_j: 1000.0,
            cooling_j: 0.0,
        }
    }
}

impl DayRow {
    fn to_row(self, index: usize) -> Vec<f64> {
        let mut row = vec![0.0; COLUMNS];
        row[0] = (index as f64 + 1.0) * 10.0;
        row[1] = 30.0;
        row[2] = 60.0;
        row[3] = self.setpoint;
        for zone in 0..3 {
            row[4 + 2 * zone] = self.zone_temp;
            row[5 + 2 * zone] = self.zone_humidity;
            row[10 + zone] = self.pmv;
        }
        row[13] = self.electric_j;
        row[14] = self.cooling_j;
        row
    }
}

/// Builds a one-day table, letting `edit` adjust each row by index.
pub fn day_table(edit: impl Fn(usize, &mut DayRow)) -> OutputTable {
    let rows = (0..DAY_ROWS)
        .map(|r| {
            let mut row = DayRow::default();
            edit(r, &mut row);
            row.to_row(r)
        })
        .collect();
    OutputTable::from_rows(rows).expect("fixture rows are rectangular")
}

/// Serializes a table as CSV with a header row.
pub fn table_csv(table: &OutputTable) -> String {
    let header: Vec<String> = (0..table.column_count()).map(|c| format!("c{c}")).collect();
    let mut out = header.join(",");
    out.push('\n');
    for row in table.rows() {
        let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        out.push_str(&cells.join(","));
        out.push('\n');
    }
    out
}
