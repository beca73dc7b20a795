//! Tabular extraction of roster spreadsheets.
//!
//! This module turns a roster sheet into an
//! [`ExtractionResult`](crate::models::ExtractionResult): it locates the header row and the
//! column index, walks the per-shift rows until the footer, reads the declared
//! footer totals, and reads workbook files into cell grids.

mod cells;
mod columns;
mod extractor;
mod workbook;

pub use cells::{DateCell, excel_serial_to_date, parse_date_text, read_count, read_date_cell, read_shift_type};
pub use columns::{ColumnField, ColumnIndex, HeaderError, build_column_index};
pub use extractor::extract_roster;
pub use workbook::{read_workbook, read_workbook_bytes};
