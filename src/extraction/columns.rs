//! Header detection and the column index of a roster sheet.

use std::collections::BTreeMap;
use std::fmt;

use crate::config::LayoutConfig;
use crate::matching::normalize_label;
use crate::models::{CellValue, RawCellGrid};

/// A logical roster column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColumnField {
    /// Date of the shift.
    Date,
    /// Shift type (first/second/third).
    ShiftType,
    /// Number of drivers the shift calls for.
    ExpectedCount,
    /// Named driver column `CONDUCTOR n`, 1-based.
    Driver(u8),
    /// Extra driver slot, 1-based.
    ExtraDriver(u8),
    /// Per-row count of services left without a driver.
    ServicesWithoutDriver,
}

impl fmt::Display for ColumnField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnField::Date => write!(f, "date"),
            ColumnField::ShiftType => write!(f, "shift_type"),
            ColumnField::ExpectedCount => write!(f, "expected_count"),
            ColumnField::Driver(n) => write!(f, "driver_{}", n),
            ColumnField::ExtraDriver(n) => write!(f, "extra_driver_{}", n),
            ColumnField::ServicesWithoutDriver => write!(f, "services_without_driver"),
        }
    }
}

const REQUIRED_FIELDS: [ColumnField; 3] = [
    ColumnField::Date,
    ColumnField::ShiftType,
    ColumnField::ExpectedCount,
];

/// Positions of the logical columns, derived once per file from its header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnIndex {
    header_row: usize,
    columns: BTreeMap<ColumnField, usize>,
}

/// Why a column index could not be built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderError {
    /// No header-like row in the scanned range.
    NotFound {
        /// Rows that were scanned.
        scanned_rows: usize,
    },
    /// A header row was found but lacks required columns.
    MissingColumns {
        /// 0-based index of the header row.
        header_row: usize,
        /// The required fields that have no column.
        missing: Vec<ColumnField>,
    },
}

impl ColumnIndex {
    /// 0-based index of the header row.
    pub fn header_row(&self) -> usize {
        self.header_row
    }

    /// Column position of a field, if the sheet has one.
    pub fn get(&self, field: ColumnField) -> Option<usize> {
        self.columns.get(&field).copied()
    }

    /// Driver columns in reading order: named drivers 1..n, then extra slots.
    pub fn driver_columns(&self) -> Vec<usize> {
        let named = self.columns.iter().filter_map(|(field, col)| match field {
            ColumnField::Driver(_) => Some(*col),
            _ => None,
        });
        let extra = self.columns.iter().filter_map(|(field, col)| match field {
            ColumnField::ExtraDriver(_) => Some(*col),
            _ => None,
        });
        named.chain(extra).collect()
    }

    /// Iterates over every located field.
    pub fn iter(&self) -> impl Iterator<Item = (ColumnField, usize)> + '_ {
        self.columns.iter().map(|(field, col)| (*field, *col))
    }

    fn is_used(&self, col: usize) -> bool {
        self.columns.values().any(|used| *used == col)
    }

    fn assign(&mut self, field: ColumnField, col: usize) -> bool {
        if self.columns.contains_key(&field) {
            return false;
        }
        self.columns.insert(field, col);
        true
    }
}

/// Locates the header row and builds the column index.
///
/// The header is the row, among the first `header_scan_rows`, matching the
/// most of the date, shift-type and expected-count labels; the earliest row
/// wins a tie. Extra-driver slots without a labelled column fall back to fixed
/// offsets after the last named driver column.
///
/// # Example
///
/// ```
/// use roster_import::config::LayoutConfig;
/// use roster_import::extraction::{build_column_index, ColumnField};
/// use roster_import::models::{CellValue, RawCellGrid};
///
/// let header = ["FECHA", "TURNO", "CANT", "CONDUCTOR 1", "CONDUCTOR 2"];
/// let grid = RawCellGrid::new(vec![header.iter().map(|h| CellValue::from(*h)).collect()]);
///
/// let index = build_column_index(&grid, &LayoutConfig::default()).unwrap();
/// assert_eq!(index.get(ColumnField::ExpectedCount), Some(2));
/// assert_eq!(index.driver_columns(), vec![3, 4, 5, 6]);
/// ```
pub fn build_column_index(
    grid: &RawCellGrid,
    layout: &LayoutConfig,
) -> Result<ColumnIndex, HeaderError> {
    let scanned_rows = layout.header_scan_rows.min(grid.row_count());
    let header_row = locate_header_row(grid, layout).ok_or(HeaderError::NotFound { scanned_rows })?;

    let mut index = ColumnIndex {
        header_row,
        columns: BTreeMap::new(),
    };
    let labels = HeaderMatcher::new(layout);

    for (col, cell) in grid.row(header_row).iter().enumerate() {
        let Some(label) = header_label(cell) else {
            continue;
        };
        match labels.classify(&label) {
            Some(LabelKind::Field(field)) => {
                index.assign(field, col);
            }
            Some(LabelKind::ExtraDriver) => {
                if let Some(slot) = free_slot(&index, layout.extra_driver_offsets.len(), ColumnField::ExtraDriver) {
                    index.assign(ColumnField::ExtraDriver(slot), col);
                }
            }
            Some(LabelKind::Driver(number)) => {
                let numbered = number
                    .filter(|n| (1..=layout.driver_columns).contains(n))
                    .map(ColumnField::Driver)
                    .filter(|field| index.get(*field).is_none());
                let field = numbered.or_else(|| {
                    free_slot(&index, layout.driver_columns as usize, ColumnField::Driver)
                        .map(ColumnField::Driver)
                });
                if let Some(field) = field {
                    index.assign(field, col);
                }
            }
            None => {}
        }
    }

    apply_extra_driver_fallback(&mut index, grid.row(header_row), layout);

    let missing: Vec<ColumnField> = REQUIRED_FIELDS
        .into_iter()
        .filter(|field| index.get(*field).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(HeaderError::MissingColumns {
            header_row,
            missing,
        });
    }

    Ok(index)
}

fn locate_header_row(grid: &RawCellGrid, layout: &LayoutConfig) -> Option<usize> {
    let required = [
        normalize_label(&layout.labels.date),
        normalize_label(&layout.labels.shift_type),
        normalize_label(&layout.labels.expected_count),
    ];

    let mut best: Option<(usize, usize)> = None;
    for row in 0..layout.header_scan_rows.min(grid.row_count()) {
        let cells: Vec<String> = grid.row(row).iter().filter_map(header_label).collect();
        let hits = required
            .iter()
            .filter(|label| !label.is_empty() && cells.iter().any(|cell| cell.contains(label.as_str())))
            .count();
        if hits > 0 && best.is_none_or(|(_, best_hits)| hits > best_hits) {
            best = Some((row, hits));
        }
    }
    best.map(|(row, _)| row)
}

fn header_label(cell: &CellValue) -> Option<String> {
    cell.as_text()
        .map(normalize_label)
        .filter(|label| !label.is_empty())
}

fn free_slot(index: &ColumnIndex, slots: usize, field: fn(u8) -> ColumnField) -> Option<u8> {
    (1..=slots.min(u8::MAX as usize) as u8).find(|slot| index.get(field(*slot)).is_none())
}

/// Claims unlabeled columns at the configured offsets after the last driver.
/// A column with its own header text is never an extra driver.
fn apply_extra_driver_fallback(index: &mut ColumnIndex, header: &[CellValue], layout: &LayoutConfig) {
    let last_driver = index
        .iter()
        .filter(|(field, _)| matches!(field, ColumnField::Driver(_)))
        .map(|(_, col)| col)
        .max();
    let Some(last_driver) = last_driver else {
        return;
    };

    for (slot, offset) in (1u8..).zip(&layout.extra_driver_offsets) {
        let field = ColumnField::ExtraDriver(slot);
        let col = last_driver + offset;
        let unlabeled = header.get(col).is_none_or(CellValue::is_blank);
        if index.get(field).is_none() && !index.is_used(col) && unlabeled {
            index.assign(field, col);
        }
    }
}

enum LabelKind {
    Field(ColumnField),
    Driver(Option<u8>),
    ExtraDriver,
}

/// Header labels, normalized once.
struct HeaderMatcher {
    services_without_driver: Vec<String>,
    date: String,
    shift_type: String,
    expected_count: String,
    extra_driver: Vec<String>,
    driver: String,
}

impl HeaderMatcher {
    fn new(layout: &LayoutConfig) -> Self {
        let normalize_all =
            |labels: &[String]| labels.iter().map(|label| normalize_label(label)).collect();
        let labels = &layout.labels;
        Self {
            services_without_driver: normalize_all(&labels.services_without_driver),
            date: normalize_label(&labels.date),
            shift_type: normalize_label(&labels.shift_type),
            expected_count: normalize_label(&labels.expected_count),
            extra_driver: normalize_all(&labels.extra_driver),
            driver: normalize_label(&labels.driver),
        }
    }

    /// Matches by substring. Order matters: `SERV SIN CONDUCTOR` must not be
    /// taken for a driver column, nor `CONDUCTOR EXTRA` for a named one.
    fn classify(&self, label: &str) -> Option<LabelKind> {
        let contains = |needle: &String| !needle.is_empty() && label.contains(needle.as_str());

        if self.services_without_driver.iter().any(contains) {
            return Some(LabelKind::Field(ColumnField::ServicesWithoutDriver));
        }
        if contains(&self.date) {
            return Some(LabelKind::Field(ColumnField::Date));
        }
        if contains(&self.shift_type) {
            return Some(LabelKind::Field(ColumnField::ShiftType));
        }
        if contains(&self.expected_count) {
            return Some(LabelKind::Field(ColumnField::ExpectedCount));
        }
        if self.extra_driver.iter().any(contains) {
            return Some(LabelKind::ExtraDriver);
        }
        if contains(&self.driver) {
            return Some(LabelKind::Driver(trailing_number(label)));
        }
        None
    }
}

fn trailing_number(label: &str) -> Option<u8> {
    label
        .split(' ')
        .rev()
        .find_map(|word| word.parse::<u8>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_row(cells: &[&str]) -> Vec<CellValue> {
        cells
            .iter()
            .map(|cell| {
                if cell.is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::from(*cell)
                }
            })
            .collect()
    }

    fn grid(rows: &[&[&str]]) -> RawCellGrid {
        RawCellGrid::new(rows.iter().map(|row| text_row(row)).collect())
    }

    #[test]
    fn test_basic_header() {
        let grid = grid(&[&["FECHA", "TURNO", "CANT", "CONDUCTOR 1", "CONDUCTOR 2"]]);
        let index = build_column_index(&grid, &LayoutConfig::default()).unwrap();

        assert_eq!(index.header_row(), 0);
        assert_eq!(index.get(ColumnField::Date), Some(0));
        assert_eq!(index.get(ColumnField::ShiftType), Some(1));
        assert_eq!(index.get(ColumnField::Driver(1)), Some(3));
        assert_eq!(index.get(ColumnField::Driver(2)), Some(4));
        assert_eq!(index.get(ColumnField::ExtraDriver(1)), Some(5));
        assert_eq!(index.get(ColumnField::ExtraDriver(2)), Some(6));
    }

    #[test]
    fn test_header_below_title_rows() {
        let grid = grid(&[
            &["PROGRAMACION DE TURNOS ENERO"],
            &[""],
            &["Fecha", "Turno", "Cantidad", "Conductor 1"],
        ]);
        let index = build_column_index(&grid, &LayoutConfig::default()).unwrap();
        assert_eq!(index.header_row(), 2);
        assert_eq!(index.get(ColumnField::ExpectedCount), Some(2));
    }

    #[test]
    fn test_services_column_not_taken_for_driver() {
        let grid = grid(&[&[
            "FECHA",
            "TURNO",
            "CANT",
            "CONDUCTOR 1",
            "CONDUCTOR 2",
            "SERV SIN CONDUCTOR",
        ]]);
        let index = build_column_index(&grid, &LayoutConfig::default()).unwrap();

        assert_eq!(index.get(ColumnField::ServicesWithoutDriver), Some(5));
        // Fallback slot 1 would collide with the services column.
        assert_eq!(index.get(ColumnField::ExtraDriver(1)), None);
        assert_eq!(index.get(ColumnField::ExtraDriver(2)), Some(6));
        assert_eq!(index.driver_columns(), vec![3, 4, 6]);
    }

    #[test]
    fn test_labelled_column_after_drivers_not_taken_as_extra() {
        let grid = grid(&[&[
            "FECHA",
            "TURNO",
            "CANT",
            "CONDUCTOR 1",
            "CONDUCTOR 2",
            "OBSERVACIONES",
            "",
        ]]);
        let index = build_column_index(&grid, &LayoutConfig::default()).unwrap();

        assert_eq!(index.get(ColumnField::ExtraDriver(1)), None);
        assert_eq!(index.get(ColumnField::ExtraDriver(2)), Some(6));
        assert_eq!(index.driver_columns(), vec![3, 4, 6]);
    }

    #[test]
    fn test_labelled_extra_driver_and_unnumbered_drivers() {
        let grid = grid(&[&["FECHA", "TURNO", "CANT", "CONDUCTOR", "CONDUCTOR", "EXTRA"]]);
        let index = build_column_index(&grid, &LayoutConfig::default()).unwrap();

        assert_eq!(index.get(ColumnField::Driver(1)), Some(3));
        assert_eq!(index.get(ColumnField::Driver(2)), Some(4));
        assert_eq!(index.get(ColumnField::ExtraDriver(1)), Some(5));
        assert_eq!(index.get(ColumnField::ExtraDriver(2)), Some(6));
    }

    #[test]
    fn test_no_header_found() {
        let grid = grid(&[&["Ana Perez", "Luis Soto"], &["1", "2"]]);
        let result = build_column_index(&grid, &LayoutConfig::default());
        assert_eq!(result, Err(HeaderError::NotFound { scanned_rows: 2 }));
    }

    #[test]
    fn test_header_beyond_scan_range_not_found() {
        let notes: &[&str] = &["notes"];
        let mut rows = vec![notes; 10];
        rows.push(&["FECHA", "TURNO", "CANT"]);
        let result = build_column_index(&grid(&rows), &LayoutConfig::default());
        assert!(matches!(result, Err(HeaderError::NotFound { .. })));
    }

    #[test]
    fn test_missing_required_columns() {
        let grid = grid(&[&["FECHA", "TURNO", "CONDUCTOR 1"]]);
        let result = build_column_index(&grid, &LayoutConfig::default());
        assert_eq!(
            result,
            Err(HeaderError::MissingColumns {
                header_row: 0,
                missing: vec![ColumnField::ExpectedCount],
            })
        );
    }

    #[test]
    fn test_field_display_names() {
        assert_eq!(ColumnField::Driver(3).to_string(), "driver_3");
        assert_eq!(ColumnField::ExtraDriver(1).to_string(), "extra_driver_1");
        assert_eq!(ColumnField::ExpectedCount.to_string(), "expected_count");
    }
}
