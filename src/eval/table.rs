//! Simulator output table and evaluation windows.

use serde::Deserialize;

use crate::error::{EvalError, EvalResult};

/// Closed row range `[start, end]` of the output table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Window {
    /// First row (inclusive).
    pub start: usize,
    /// Last row (inclusive).
    pub end: usize,
}

impl Window {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Converts an hour range into rows of a table sampled `timesteps_per_hour` times per hour.
    ///
    /// Rows are stamped at the end of their interval, so hour `h` ends at row
    /// `h * timesteps_per_hour - 1`; a start hour of 0 maps to row 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use setpoint_eval::eval::table::Window;
    ///
    /// let w = Window::from_hours(7, 21, 6);
    /// assert_eq!((w.start, w.end), (41, 125));
    /// ```
    pub fn from_hours(start_hour: usize, end_hour: usize, timesteps_per_hour: usize) -> Self {
        Self {
            start: (start_hour * timesteps_per_hour).saturating_sub(1),
            end: (end_hour * timesteps_per_hour).saturating_sub(1),
        }
    }

    /// Number of rows covered; zero when `end < start`.
    pub fn len(&self) -> usize {
        if self.end < self.start {
            0
        } else {
            self.end - self.start + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn rows(&self) -> std::ops::RangeInclusive<usize> {
        self.start..=self.end
    }
}

/// Immutable rectangular table of simulator output (rows = timesteps).
#[derive(Debug, Clone, PartialEq)]
pub struct OutputTable {
    rows: Vec<Vec<f64>>,
    columns: usize,
}

impl OutputTable {
    /// Builds a table, rejecting ragged rows.
    ///
    /// # Errors
    ///
    /// Returns `EvalError::RaggedRow` if any row length differs from the first.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> EvalResult<Self> {
        let columns = rows.first().map_or(0, Vec::len);
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != columns) {
            return Err(EvalError::RaggedRow {
                row,
                expected: columns,
                actual: r.len(),
            });
        }
        Ok(Self { rows, columns })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Checks that the window and every column address data in the table.
    ///
    /// # Errors
    ///
    /// `EmptyWindow`, `RowOutOfRange` or `ColumnOutOfRange`.
    pub fn check(&self, window: Window, columns: &[usize]) -> EvalResult<()> {
        if window.is_empty() {
            return Err(EvalError::EmptyWindow {
                start: window.start,
                end: window.end,
            });
        }
        if window.end >= self.rows.len() {
            return Err(EvalError::RowOutOfRange {
                row: window.end,
                rows: self.rows.len(),
            });
        }
        if let Some(&column) = columns.iter().find(|&&c| c >= self.columns) {
            return Err(EvalError::ColumnOutOfRange {
                column,
                columns: self.columns,
            });
        }
        Ok(())
    }

    /// Values of one column over a window.
    ///
    /// # Errors
    ///
    /// See [`OutputTable::check`].
    pub fn column(&self, column: usize, window: Window) -> EvalResult<Vec<f64>> {
        self.check(window, &[column])?;
        Ok(self.rows[window.rows()].iter().map(|r| r[column]).collect())
    }

    /// Sub-table of the given columns over a window, in column order given.
    ///
    /// # Errors
    ///
    /// See [`OutputTable::check`].
    pub fn slice(&self, window: Window, columns: &[usize]) -> EvalResult<Vec<Vec<f64>>> {
        self.check(window, columns)?;
        Ok(self.rows[window.rows()]
            .iter()
            .map(|r| columns.iter().map(|&c| r[c]).collect())
            .collect())
    }

    /// Per-row sum of the given columns over a window.
    ///
    /// # Errors
    ///
    /// See [`OutputTable::check`].
    pub fn row_sums(&self, window: Window, columns: &[usize]) -> EvalResult<Vec<f64>> {
        self.check(window, columns)?;
        Ok(self.rows[window.rows()]
            .iter()
            .map(|r| columns.iter().map(|&c| r[c]).sum())
            .collect())
    }
}
