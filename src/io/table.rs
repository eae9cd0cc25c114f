//! CSV import for simulator output tables and variable vectors.
//!
//! Every reader accepts an optional header row: a first record with any
//! non-numeric cell is skipped, and a non-numeric cell anywhere else is
//! a fatal parse error.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use tracing::debug;

use crate::error::{EvalError, EvalResult};
use crate::eval::OutputTable;

/// Reads a simulator output table from a CSV file.
///
/// # Errors
///
/// Returns an `EvalError` if the file cannot be opened, a cell is not
/// numeric, rows are ragged, or there are no data rows.
pub fn read_table(path: &Path) -> EvalResult<OutputTable> {
    let file = File::open(path)?;
    read_table_from(io::BufReader::new(file))
}

/// Reads a simulator output table from any CSV source.
///
/// # Errors
///
/// See [`read_table`].
pub fn read_table_from(reader: impl Read) -> EvalResult<OutputTable> {
    let rows = read_numeric_rows(reader)?;
    if rows.is_empty() {
        return Err(EvalError::EmptyInput("output table".to_string()));
    }
    let table = OutputTable::from_rows(rows)?;
    debug!(
        rows = table.row_count(),
        columns = table.column_count(),
        "output table loaded"
    );
    Ok(table)
}

/// Reads an optimization variable vector from a CSV file.
///
/// Values may be laid out as one row, one column, or both; they are read
/// in row-major order.
///
/// # Errors
///
/// Returns an `EvalError` if the file cannot be opened, a cell is not
/// numeric, or there are no values.
pub fn read_variables(path: &Path) -> EvalResult<Vec<f64>> {
    let file = File::open(path)?;
    read_variables_from(io::BufReader::new(file))
}

/// Reads an optimization variable vector from any CSV source.
///
/// # Errors
///
/// See [`read_variables`].
pub fn read_variables_from(reader: impl Read) -> EvalResult<Vec<f64>> {
    let values: Vec<f64> = read_numeric_rows(reader)?.into_iter().flatten().collect();
    if values.is_empty() {
        return Err(EvalError::EmptyInput("variable vector".to_string()));
    }
    Ok(values)
}

/// Reads a setpoint schedule from a CSV file.
///
/// Two-column files are read as `slot,setpoint` (the layout written by
/// [`crate::io::export::write_schedule`]); anything else is read like a
/// variable vector.
///
/// # Errors
///
/// Returns an `EvalError` if the file cannot be opened, a cell is not
/// numeric, or there are no values.
pub fn read_schedule(path: &Path) -> EvalResult<Vec<f64>> {
    let file = File::open(path)?;
    read_schedule_from(io::BufReader::new(file))
}

/// Reads a setpoint schedule from any CSV source.
///
/// # Errors
///
/// See [`read_schedule`].
pub fn read_schedule_from(reader: impl Read) -> EvalResult<Vec<f64>> {
    let rows = read_numeric_rows(reader)?;
    let values: Vec<f64> = if rows.len() > 1 && rows.iter().all(|r| r.len() == 2) {
        rows.into_iter().map(|r| r[1]).collect()
    } else {
        rows.into_iter().flatten().collect()
    };
    if values.is_empty() {
        return Err(EvalError::EmptyInput("schedule".to_string()));
    }
    Ok(values)
}

fn read_numeric_rows(reader: impl Read) -> EvalResult<Vec<Vec<f64>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (index, record) in rdr.records().enumerate() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        if index == 0 && record.iter().any(|cell| cell.parse::<f64>().is_err()) {
            debug!(header = ?record, "skipping header row");
            continue;
        }
        let row = record
            .iter()
            .enumerate()
            .map(|(column, cell)| {
                cell.parse::<f64>().map_err(|_| EvalError::Parse {
                    row: index,
                    column,
                    value: cell.to_string(),
                })
            })
            .collect::<EvalResult<Vec<f64>>>()?;
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_row_is_skipped() {
        let csv = "time,setpoint,energy\n0,24.0,1000\n10,24.5,1200\n";
        let table = read_table_from(csv.as_bytes()).unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.rows()[1], vec![10.0, 24.5, 1200.0]);
    }

    #[test]
    fn headerless_table_keeps_first_row() {
        let table = read_table_from("1,2\n3,4\n".as_bytes()).unwrap();
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn non_numeric_body_cell_is_fatal() {
        let err = read_table_from("a,b\n1,2\n3,x\n".as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            EvalError::Parse { row: 2, column: 1, ref value } if value == "x"
        ));
    }

    #[test]
    fn ragged_table_is_fatal() {
        let err = read_table_from("1,2,3\n4,5\n".as_bytes()).unwrap_err();
        assert!(matches!(err, EvalError::RaggedRow { row: 1, .. }));
    }

    #[test]
    fn empty_table_is_fatal() {
        let err = read_table_from("a,b\n".as_bytes()).unwrap_err();
        assert!(matches!(err, EvalError::EmptyInput(_)));
    }

    #[test]
    fn variables_read_as_row_or_column() {
        let row = read_variables_from("0.1,0.2,0.3\n".as_bytes()).unwrap();
        let column = read_variables_from("x\n0.1\n0.2\n0.3\n".as_bytes()).unwrap();
        assert_eq!(row, vec![0.1, 0.2, 0.3]);
        assert_eq!(row, column);
    }

    #[test]
    fn schedule_reads_setpoint_column() {
        let csv = "slot,setpoint_c\n0,25.0\n1,24.0\n2,23.5\n";
        assert_eq!(read_schedule_from(csv.as_bytes()).unwrap(), vec![25.0, 24.0, 23.5]);
        assert_eq!(
            read_schedule_from("25,24,23.5\n".as_bytes()).unwrap(),
            vec![25.0, 24.0, 23.5]
        );
    }
}
