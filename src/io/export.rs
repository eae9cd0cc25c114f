//! CSV and JSON export for schedules and objective reports.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::error::EvalResult;
use crate::eval::ObjectiveReport;

/// Exports an hourly schedule to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `EvalError` if file creation or writing fails.
pub fn export_schedule(schedule: &[f64], path: &Path) -> EvalResult<()> {
    let file = File::create(path)?;
    write_schedule(schedule, io::BufWriter::new(file))
}

/// Writes an hourly schedule as `slot,setpoint_c` rows.
///
/// # Arguments
///
/// * `schedule` - One setpoint per hourly slot, starting at 0:00
/// * `writer` - Destination implementing `Write`
///
/// # Errors
///
/// Returns an `EvalError` if writing fails.
pub fn write_schedule(schedule: &[f64], writer: impl Write) -> EvalResult<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(["slot", "setpoint_c"])?;
    for (slot, value) in schedule.iter().enumerate() {
        wtr.write_record(&[slot.to_string(), format!("{value:.1}")])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes a per-timestep setpoint trace as `row,time_hr,setpoint_c` rows.
///
/// Row `r` is stamped at the end of its interval, `(r + 1) / timesteps_per_hour` hours.
///
/// # Errors
///
/// Returns an `EvalError` if writing fails.
pub fn write_trace(trace: &[f64], timesteps_per_hour: usize, writer: impl Write) -> EvalResult<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(["row", "time_hr", "setpoint_c"])?;
    let per_hour = timesteps_per_hour.max(1) as f64;
    for (row, value) in trace.iter().enumerate() {
        wtr.write_record(&[
            row.to_string(),
            format!("{:.4}", (row + 1) as f64 / per_hour),
            format!("{value:.1}"),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Exports an objective report to the given path.
///
/// A `.json` extension selects JSON; anything else is written as CSV.
///
/// # Errors
///
/// Returns an `EvalError` if file creation, serialization or writing fails.
pub fn export_report(report: &ObjectiveReport, path: &Path) -> EvalResult<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")) {
        write_report_json(report, buf)
    } else {
        write_report_csv(report, buf)
    }
}

/// Writes a report as a header row and one value row.
///
/// # Errors
///
/// Returns an `EvalError` if writing fails.
pub fn write_report_csv(report: &ObjectiveReport, writer: impl Write) -> EvalResult<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(ObjectiveReport::FIELDS)?;
    wtr.write_record(report.values().iter().map(f64::to_string))?;
    wtr.flush()?;
    Ok(())
}

/// Writes a report as pretty-printed JSON.
///
/// Non-finite objectives are written as `null`.
///
/// # Errors
///
/// Returns an `EvalError` if serialization or writing fails.
pub fn write_report_json(report: &ObjectiveReport, mut writer: impl Write) -> EvalResult<()> {
    serde_json::to_writer_pretty(&mut writer, report)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
