//! Reading roster workbooks into cell grids.
//!
//! Only the first sheet is read. Cells keep their spreadsheet positions:
//! leading blank rows and columns are restored so that row numbers in
//! diagnostics match what the operator sees.

use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Range, Reader, Sheets, open_workbook_auto, open_workbook_auto_from_rs};
use tracing::debug;

use crate::error::{ImportError, ImportResult};
use crate::models::{CellValue, RawCellGrid};

/// Reads the first sheet of an `.xlsx`, `.xlsm`, `.xls` or `.ods` file.
pub fn read_workbook(path: impl AsRef<Path>) -> ImportResult<RawCellGrid> {
    let path = path.as_ref();
    let name = path.display().to_string();
    let workbook = open_workbook_auto(path).map_err(|e| workbook_error(&name, e))?;
    first_sheet(workbook, &name)
}

/// Reads the first sheet of an uploaded workbook held in memory.
///
/// The format is detected from the content.
pub fn read_workbook_bytes(name: &str, bytes: &[u8]) -> ImportResult<RawCellGrid> {
    let workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|e| workbook_error(name, e))?;
    first_sheet(workbook, name)
}

fn first_sheet<RS>(mut workbook: Sheets<RS>, name: &str) -> ImportResult<RawCellGrid>
where
    RS: std::io::Read + std::io::Seek,
{
    let sheet_names = workbook.sheet_names();
    let Some(sheet) = sheet_names.first().cloned() else {
        return Err(ImportError::WorkbookError {
            path: name.to_string(),
            message: "workbook has no sheets".to_string(),
        });
    };

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| workbook_error(name, e))?;

    let grid = range_to_grid(&range);
    debug!(
        source = name,
        sheet = sheet.as_str(),
        rows = grid.row_count(),
        "Read roster workbook"
    );
    Ok(grid)
}

fn workbook_error(name: &str, cause: impl std::fmt::Display) -> ImportError {
    ImportError::WorkbookError {
        path: name.to_string(),
        message: cause.to_string(),
    }
}

/// Converts a calamine range to a grid anchored at cell A1.
pub(crate) fn range_to_grid(range: &Range<Data>) -> RawCellGrid {
    let Some((first_row, first_col)) = range.start() else {
        return RawCellGrid::default();
    };

    let mut rows: Vec<Vec<CellValue>> = vec![Vec::new(); first_row as usize];
    for cells in range.rows() {
        let mut row = vec![CellValue::Empty; first_col as usize];
        row.extend(cells.iter().map(to_cell_value));
        while row.last().is_some_and(CellValue::is_blank) {
            row.pop();
        }
        rows.push(row);
    }
    RawCellGrid::new(rows)
}

fn to_cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Float(v) => CellValue::Number(*v),
        Data::Int(v) => CellValue::Number(*v as f64),
        Data::DateTime(v) => CellValue::Number(v.as_f64()),
        Data::String(v) | Data::DateTimeIso(v) | Data::DurationIso(v) => {
            if v.trim().is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(v.clone())
            }
        }
        Data::Bool(v) => CellValue::Text(v.to_string()),
        Data::Error(_) | Data::Empty => CellValue::Empty,
    }
}
