//! Raw spreadsheet cells and the grid they arrive in.

use serde::{Deserialize, Serialize};

/// A single scalar cell value read from a roster sheet.
///
/// Numeric cells include spreadsheet dates, which arrive as serial day counts.
/// JSON `null` deserializes to [`CellValue::Empty`].
///
/// # Example
///
/// ```
/// use roster_import::models::CellValue;
///
/// let cells: Vec<CellValue> = serde_json::from_str(r#"[45663, "PRIMER TURNO", null]"#).unwrap();
/// assert_eq!(cells[0], CellValue::Number(45663.0));
/// assert_eq!(cells[1], CellValue::Text("PRIMER TURNO".to_string()));
/// assert_eq!(cells[2], CellValue::Empty);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// A numeric cell (plain numbers and spreadsheet date serials).
    Number(f64),
    /// A text cell, as typed.
    Text(String),
    /// A blank cell.
    Empty,
}

impl CellValue {
    /// Returns the trimmed text of a non-blank text cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(text) => {
                let trimmed = text.trim();
                (!trimmed.is_empty()).then_some(trimmed)
            }
            _ => None,
        }
    }

    /// Returns true for empty cells and whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(text) => text.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

static EMPTY_CELL: CellValue = CellValue::Empty;

/// An immutable grid of roster cells, row by row.
///
/// Rows may be ragged; reading outside a row yields [`CellValue::Empty`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawCellGrid {
    rows: Vec<Vec<CellValue>>,
}

impl RawCellGrid {
    /// Wraps a list of rows.
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    /// Number of rows in the grid.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns the cells of one row, or an empty slice past the end.
    pub fn row(&self, row: usize) -> &[CellValue] {
        self.rows.get(row).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns a single cell, treating anything out of range as empty.
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Iterates over all rows in order.
    pub fn rows(&self) -> impl Iterator<Item = &[CellValue]> {
        self.rows.iter().map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_out_of_range_is_empty() {
        let grid = RawCellGrid::new(vec![vec![CellValue::from("FECHA")]]);
        assert_eq!(grid.cell(0, 0), &CellValue::Text("FECHA".to_string()));
        assert_eq!(grid.cell(0, 5), &CellValue::Empty);
        assert_eq!(grid.cell(9, 0), &CellValue::Empty);
        assert!(grid.row(3).is_empty());
    }

    #[test]
    fn test_as_text_trims_and_skips_blank() {
        assert_eq!(CellValue::from("  Ana  ").as_text(), Some("Ana"));
        assert_eq!(CellValue::from("   ").as_text(), None);
        assert_eq!(CellValue::Number(3.0).as_text(), None);
    }

    #[test]
    fn test_is_blank() {
        assert!(CellValue::Empty.is_blank());
        assert!(CellValue::from(" ").is_blank());
        assert!(!CellValue::Number(0.0).is_blank());
    }

    #[test]
    fn test_grid_deserializes_from_nested_arrays() {
        let grid: RawCellGrid =
            serde_json::from_str(r#"[["FECHA", "TURNO"], [45663, null]]"#).unwrap();
        assert_eq!(grid.row_count(), 2);
        assert_eq!(grid.cell(1, 0), &CellValue::Number(45663.0));
        assert_eq!(grid.cell(1, 1), &CellValue::Empty);
    }
}
