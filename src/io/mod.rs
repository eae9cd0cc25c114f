//! File I/O around the evaluation core.

pub mod export;
pub mod table;

pub use table::{read_schedule, read_table, read_variables};
