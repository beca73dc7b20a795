//! The tabular extractor: one roster grid in, one [`ExtractionResult`] out.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::debug;

use crate::config::{LayoutConfig, ShiftsConfig};
use crate::matching::{display_name, normalize_label, normalize_name};
use crate::models::{
    CellValue, Diagnostic, DiagnosticCode, ExtractionResult, RawCellGrid, ShiftRecord,
};

use super::cells::{DateCell, is_sentinel, read_count, read_date_cell, read_shift_type};
use super::columns::{ColumnField, ColumnIndex, HeaderError, build_column_index};

/// Extracts shift records and declared totals from a roster grid.
///
/// Never fails: a missing header yields a result with a fatal error and no
/// records, and every per-row problem is recorded as a warning. Declared
/// totals are read but not checked; see
/// [`reconcile_counts`](crate::import::reconcile_counts).
///
/// # Example
///
/// ```
/// use roster_import::config::{LayoutConfig, ShiftsConfig};
/// use roster_import::extraction::extract_roster;
/// use roster_import::models::{CellValue, RawCellGrid};
///
/// let grid: RawCellGrid = serde_json::from_str(r#"[
///     ["FECHA", "TURNO", "CANT", "CONDUCTOR 1", "CONDUCTOR 2"],
///     [45663, "PRIMER TURNO", 2, "Ana Perez", "Luis Soto"],
///     ["TOTAL", 2]
/// ]"#).unwrap();
///
/// let result = extract_roster(&grid, "enero.xlsx", &LayoutConfig::default(), &ShiftsConfig::default());
/// assert!(result.errors.is_empty());
/// assert_eq!(result.shift_records[0].assigned_names, vec!["Ana Perez", "Luis Soto"]);
/// assert_eq!(result.declared_total, Some(2));
/// ```
pub fn extract_roster(
    grid: &RawCellGrid,
    source_name: &str,
    layout: &LayoutConfig,
    shifts: &ShiftsConfig,
) -> ExtractionResult {
    let mut result = ExtractionResult::new(source_name);

    let index = match build_column_index(grid, layout) {
        Ok(index) => index,
        Err(error) => {
            result.errors.push(header_diagnostic(error, layout));
            debug!(source = source_name, errors = result.errors.len(), "Roster header not found");
            return result;
        }
    };

    let markers = FooterMarkers::new(layout);
    let data_end_row = find_data_end(grid, &index, &markers, layout);

    let mut pass = ShiftPass {
        index: &index,
        layout,
        shifts,
        current_date: None,
    };
    for row in index.header_row() + 1..data_end_row {
        pass.read_row(grid, row, &mut result);
    }

    report_rows_after_data_end(grid, &index, data_end_row, shifts, &mut result);
    read_declared_totals(grid, data_end_row, &markers, &mut result);

    debug!(
        source = source_name,
        header_row = index.header_row() + 1,
        data_end_row = data_end_row + 1,
        records = result.shift_records.len(),
        warnings = result.warnings.len(),
        "Extracted roster"
    );
    result
}

fn header_diagnostic(error: HeaderError, layout: &LayoutConfig) -> Diagnostic {
    match error {
        HeaderError::NotFound { scanned_rows } => Diagnostic::new(
            DiagnosticCode::HeaderNotFound,
            format!(
                "No header row with {}/{}/{} in the first {} rows",
                layout.labels.date, layout.labels.shift_type, layout.labels.expected_count, scanned_rows
            ),
        ),
        HeaderError::MissingColumns {
            header_row,
            missing,
        } => {
            let names: Vec<String> = missing.iter().map(ColumnField::to_string).collect();
            Diagnostic::at_row(
                DiagnosticCode::MissingColumns,
                header_row + 1,
                format!("Header is missing required columns: {}", names.join(", ")),
            )
        }
    }
}

/// Footer markers, normalized once.
struct FooterMarkers {
    total: String,
    services_without_driver: Vec<String>,
}

impl FooterMarkers {
    fn new(layout: &LayoutConfig) -> Self {
        Self {
            total: normalize_label(&layout.total_marker),
            services_without_driver: layout
                .services_without_driver_markers
                .iter()
                .map(|marker| normalize_label(marker))
                .filter(|marker| !marker.is_empty())
                .collect(),
        }
    }

    fn is_services(&self, label: &str) -> bool {
        self.services_without_driver
            .iter()
            .any(|marker| label.contains(marker.as_str()))
    }

    fn is_total(&self, label: &str) -> bool {
        !self.total.is_empty() && label.starts_with(self.total.as_str())
    }
}

/// First row, after the header, that ends the per-shift data.
fn find_data_end(
    grid: &RawCellGrid,
    index: &ColumnIndex,
    markers: &FooterMarkers,
    layout: &LayoutConfig,
) -> usize {
    (index.header_row() + 1..grid.row_count())
        .find(|row| {
            let has_marker = grid
                .row(*row)
                .iter()
                .filter_map(|cell| cell.as_text().map(normalize_label))
                .any(|label| markers.is_total(&label) || markers.is_services(&label));
            has_marker || is_recap_line(grid, *row, index, layout)
        })
        .unwrap_or(grid.row_count())
}

/// A row listing names only: no date or shift type, and a long all-letter cell.
fn is_recap_line(grid: &RawCellGrid, row: usize, index: &ColumnIndex, layout: &LayoutConfig) -> bool {
    let blank = |field| index.get(field).is_none_or(|col| grid.cell(row, col).is_blank());
    if !blank(ColumnField::Date) || !blank(ColumnField::ShiftType) {
        return false;
    }
    grid.row(row).iter().filter_map(CellValue::as_text).any(|text| {
        text.chars().count() >= layout.recap_min_length
            && text.chars().all(|c| c.is_alphabetic() || c.is_whitespace())
    })
}

/// Warns once when shift-shaped rows follow the end of the shift pass.
fn report_rows_after_data_end(
    grid: &RawCellGrid,
    index: &ColumnIndex,
    data_end_row: usize,
    shifts: &ShiftsConfig,
    result: &mut ExtractionResult,
) {
    let (Some(shift_col), Some(count_col)) = (
        index.get(ColumnField::ShiftType),
        index.get(ColumnField::ExpectedCount),
    ) else {
        return;
    };

    let skipped = (data_end_row + 1..grid.row_count())
        .filter(|row| {
            read_shift_type(grid.cell(*row, shift_col), shifts).is_some()
                && read_count(grid.cell(*row, count_col)).is_some_and(|count| count > 0)
        })
        .count();
    if skipped > 0 {
        result.warnings.push(Diagnostic::at_row(
            DiagnosticCode::RowsAfterDataEnd,
            data_end_row + 1,
            format!(
                "{} shift rows after row {} were not read",
                skipped,
                data_end_row + 1
            ),
        ));
    }
}

static EMPTY: CellValue = CellValue::Empty;

/// Per-row state of the shift pass.
struct ShiftPass<'a> {
    index: &'a ColumnIndex,
    layout: &'a LayoutConfig,
    shifts: &'a ShiftsConfig,
    current_date: Option<NaiveDate>,
}

impl ShiftPass<'_> {
    fn cell<'g>(&self, grid: &'g RawCellGrid, row: usize, field: ColumnField) -> &'g CellValue {
        match self.index.get(field) {
            Some(col) => grid.cell(row, col),
            None => &EMPTY,
        }
    }

    fn read_row(&mut self, grid: &RawCellGrid, row: usize, result: &mut ExtractionResult) {
        let source_row = row + 1;

        match read_date_cell(self.cell(grid, row, ColumnField::Date)) {
            DateCell::Continue => {}
            DateCell::Date(date) => self.current_date = Some(date),
            DateCell::Invalid(value) => {
                self.current_date = None;
                result.warnings.push(Diagnostic::at_row(
                    DiagnosticCode::InvalidDate,
                    source_row,
                    format!("Unreadable date '{}'", value),
                ));
            }
        }

        let shift_cell = self.cell(grid, row, ColumnField::ShiftType);
        if shift_cell.is_blank() || is_sentinel(shift_cell, &self.layout.cancellation_sentinel) {
            return;
        }
        let Some(shift_type) = read_shift_type(shift_cell, self.shifts) else {
            result.warnings.push(Diagnostic::at_row(
                DiagnosticCode::UnknownShiftType,
                source_row,
                format!("Unknown shift type '{}'", describe(shift_cell)),
            ));
            return;
        };

        let expected_count = match read_count(self.cell(grid, row, ColumnField::ExpectedCount)) {
            Some(count) if count > 0 => count,
            _ => return,
        };

        let Some(date) = self.current_date else {
            result.warnings.push(Diagnostic::at_row(
                DiagnosticCode::MissingDate,
                source_row,
                format!("{} shift has no date", shift_type),
            ));
            return;
        };

        let mut seen = HashSet::new();
        let mut assigned_names = Vec::new();
        for col in self.index.driver_columns() {
            let Some(name) = self.read_name(grid.cell(row, col)) else {
                continue;
            };
            if seen.insert(normalize_name(name)) {
                assigned_names.push(display_name(name));
            } else {
                result.warnings.push(Diagnostic::at_row(
                    DiagnosticCode::DuplicateName,
                    source_row,
                    format!("{} {}: '{}' is listed twice", date, shift_type, display_name(name)),
                ));
            }
        }

        let found = assigned_names.len();
        if found != expected_count as usize {
            result.warnings.push(Diagnostic::at_row(
                DiagnosticCode::CountMismatch,
                source_row,
                format!("{} {}: expected {}, found {}", date, shift_type, expected_count, found),
            ));
        }

        let services_without_driver =
            read_count(self.cell(grid, row, ColumnField::ServicesWithoutDriver)).unwrap_or(0);

        result.shift_records.push(ShiftRecord {
            date,
            shift_type,
            expected_count,
            assigned_names,
            services_without_driver,
            source_row,
        });
    }

    fn read_name<'c>(&self, cell: &'c CellValue) -> Option<&'c str> {
        let text = cell.as_text()?;
        if is_sentinel(cell, &self.layout.cancellation_sentinel)
            || text.chars().count() < self.layout.min_name_length
            || normalize_name(text).is_empty()
        {
            return None;
        }
        Some(text)
    }
}

fn describe(cell: &CellValue) -> String {
    match cell {
        CellValue::Number(number) => number.to_string(),
        CellValue::Text(text) => text.trim().to_string(),
        CellValue::Empty => String::new(),
    }
}

/// Reads declared totals from the footer rows.
///
/// The value is the first numeric cell right of the marker, or the cell just
/// below it. The first occurrence of each marker wins.
fn read_declared_totals(
    grid: &RawCellGrid,
    data_end_row: usize,
    markers: &FooterMarkers,
    result: &mut ExtractionResult,
) {
    for row in data_end_row..grid.row_count() {
        for (col, cell) in grid.row(row).iter().enumerate() {
            let Some(label) = cell.as_text().map(normalize_label) else {
                continue;
            };
            if markers.is_services(&label) {
                if result.declared_services_without_driver.is_none() {
                    result.declared_services_without_driver = adjacent_count(grid, row, col);
                }
            } else if markers.is_total(&label) && result.declared_total.is_none() {
                result.declared_total = adjacent_count(grid, row, col);
            }
        }
    }
}

fn adjacent_count(grid: &RawCellGrid, row: usize, col: usize) -> Option<u32> {
    grid.row(row)
        .iter()
        .skip(col + 1)
        .find_map(read_count)
        .or_else(|| read_count(grid.cell(row + 1, col)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ShiftType;

    fn extract(json: &str) -> ExtractionResult {
        let grid: RawCellGrid = serde_json::from_str(json).unwrap();
        extract_roster(&grid, "roster.xlsx", &LayoutConfig::default(), &ShiftsConfig::default())
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const HEADER: &str = r#"["FECHA", "TURNO", "CANT", "CONDUCTOR 1", "CONDUCTOR 2"]"#;

    fn roster(rows: &[&str]) -> ExtractionResult {
        let mut all = vec![HEADER];
        all.extend_from_slice(rows);
        extract(&format!("[{}]", all.join(",")))
    }

    #[test]
    fn test_single_row_with_total() {
        let result = roster(&[
            r#"["2025-01-06", "PRIMER TURNO", 2, "Ana Perez", "Luis Soto"]"#,
            r#"["TOTAL", 2]"#,
        ]);

        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
        assert_eq!(result.shift_records.len(), 1);

        let record = &result.shift_records[0];
        assert_eq!(record.date, date(2025, 1, 6));
        assert_eq!(record.shift_type, ShiftType::First);
        assert_eq!(record.expected_count, 2);
        assert_eq!(record.assigned_names, vec!["Ana Perez", "Luis Soto"]);
        assert_eq!(record.source_row, 2);
        assert_eq!(result.declared_total, Some(2));
        assert_eq!(result.declared_services_without_driver, None);
    }

    #[test]
    fn test_missing_header_is_fatal() {
        let result = extract(r#"[["Ana Perez", "Luis Soto"], [45663, 1, 2]]"#);
        assert!(result.shift_records.is_empty());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, DiagnosticCode::HeaderNotFound);
        assert!(!result.is_importable());
    }

    #[test]
    fn test_missing_count_column_is_fatal() {
        let result = extract(r#"[["FECHA", "TURNO", "CONDUCTOR 1"], [45663, 1, "Ana Perez"]]"#);
        assert!(result.shift_records.is_empty());
        assert_eq!(result.errors[0].code, DiagnosticCode::MissingColumns);
        assert_eq!(result.errors[0].row, Some(1));
    }

    #[test]
    fn test_count_mismatch_is_a_single_warning() {
        let result = roster(&[r#"[45663, "PRIMER TURNO", 3, "Ana Perez", "Luis Soto"]"#]);

        assert!(result.errors.is_empty());
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].code, DiagnosticCode::CountMismatch);
        assert!(result.warnings[0].message.contains("expected 3, found 2"));
        assert!(result.warnings[0].message.contains("2025-01-06"));
    }

    #[test]
    fn test_duplicate_name_dropped_with_warning() {
        let result = roster(&[r#"[45663, 1, 2, "Ana Pérez", "ana perez"]"#]);

        let record = &result.shift_records[0];
        assert_eq!(record.assigned_names, vec!["Ana Pérez"]);
        assert_eq!(result.warning_count(DiagnosticCode::DuplicateName), 1);
        assert_eq!(result.warning_count(DiagnosticCode::CountMismatch), 1);
    }

    #[test]
    fn test_date_context_carries_forward() {
        let result = roster(&[
            r#"[45663, "PRIMER TURNO", 1, "Ana Perez"]"#,
            r#"[null, "SEGUNDO TURNO", 1, "Luis Soto"]"#,
            r#"[45664, "TERCER TURNO", 1, "Ana Perez"]"#,
        ]);

        let keys: Vec<(NaiveDate, ShiftType)> = result
            .shift_records
            .iter()
            .map(|record| (record.date, record.shift_type))
            .collect();
        assert_eq!(
            keys,
            vec![
                (date(2025, 1, 6), ShiftType::First),
                (date(2025, 1, 6), ShiftType::Second),
                (date(2025, 1, 7), ShiftType::Third),
            ]
        );
    }

    #[test]
    fn test_cancelled_and_zero_count_rows_skipped() {
        let result = roster(&[
            r#"[45663, "X", 2, "Ana Perez", "Luis Soto"]"#,
            r#"[null, "SEGUNDO TURNO", 0, "Ana Perez"]"#,
            r#"[null, "TERCER TURNO", null, "Ana Perez"]"#,
        ]);
        assert!(result.shift_records.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_non_names_ignored() {
        let result = roster(&[r#"[45663, 1, 1, "X", "A", 7, "Luis Soto"]"#]);
        assert_eq!(result.shift_records[0].assigned_names, vec!["Luis Soto"]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_extra_driver_fallback_columns_read() {
        let result = roster(&[r#"[45663, 1, 3, "Ana Perez", "Luis Soto", "Marta Diaz"]"#]);
        assert_eq!(
            result.shift_records[0].assigned_names,
            vec!["Ana Perez", "Luis Soto", "Marta Diaz"]
        );
    }

    #[test]
    fn test_unknown_shift_and_missing_date_warn() {
        let result = roster(&[
            r#"[null, "PRIMER TURNO", 1, "Ana Perez"]"#,
            r#"[45663, "GUARDIA", 1, "Ana Perez"]"#,
        ]);
        assert!(result.shift_records.is_empty());
        assert_eq!(result.warning_count(DiagnosticCode::MissingDate), 1);
        assert_eq!(result.warning_count(DiagnosticCode::UnknownShiftType), 1);
    }

    #[test]
    fn test_invalid_date_clears_context() {
        let result = roster(&[
            r#"[45663, 1, 1, "Ana Perez"]"#,
            r#"["LUNES", 2, 1, "Luis Soto"]"#,
        ]);
        assert_eq!(result.shift_records.len(), 1);
        assert_eq!(result.warning_count(DiagnosticCode::InvalidDate), 1);
        assert_eq!(result.warning_count(DiagnosticCode::MissingDate), 1);
        assert_eq!(result.warnings[0].row, Some(3));
    }

    #[test]
    fn test_rows_after_terminator_are_not_shifts() {
        let result = roster(&[
            r#"[45663, 1, 1, "Ana Perez"]"#,
            r#"["TOTAL", null, 1]"#,
            r#"[45664, 1, 1, "Luis Soto"]"#,
        ]);
        assert_eq!(result.shift_records.len(), 1);
        assert_eq!(result.declared_total, Some(1));
        assert_eq!(result.warning_count(DiagnosticCode::RowsAfterDataEnd), 1);
    }

    #[test]
    fn test_recap_line_terminates() {
        let result = roster(&[
            r#"[45663, 1, 1, "Ana Perez"]"#,
            r#"[null, null, null, "ANA PEREZ LUIS SOTO MARTA DIAZ"]"#,
            r#"[45664, 1, 1, "Luis Soto"]"#,
        ]);
        assert_eq!(result.shift_records.len(), 1);
        assert_eq!(result.declared_total, None);

        let warning = &result.warnings[0];
        assert_eq!(warning.code, DiagnosticCode::RowsAfterDataEnd);
        assert_eq!(warning.row, Some(3));
        assert_eq!(warning.message, "1 shift rows after row 3 were not read");
    }

    #[test]
    fn test_long_name_between_days_warns_about_lost_rows() {
        let result = roster(&[
            r#"[45663, 1, 1, "Ana Perez"]"#,
            r#"[null, null, null, "Maria Jose Gonzalez Perez"]"#,
            r#"[45664, 1, 2, "Luis Soto", "Marta Diaz"]"#,
            r#"["TOTAL", 3]"#,
        ]);
        assert_eq!(result.shift_records.len(), 1);
        assert_eq!(result.declared_total, Some(3));
        assert_eq!(result.warning_count(DiagnosticCode::RowsAfterDataEnd), 1);
    }

    #[test]
    fn test_clean_footer_has_no_lost_rows_warning() {
        let result = roster(&[r#"[45663, 1, 1, "Ana Perez"]"#, r#"["TOTAL", 1]"#]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_notes_column_after_drivers_not_read_as_names() {
        let grid: RawCellGrid = serde_json::from_str(
            r#"[
                ["FECHA", "TURNO", "CANT", "CONDUCTOR 1", "CONDUCTOR 2", "OBSERVACIONES"],
                [45663, 1, 2, "Ana Perez", "Luis Soto", "Cambio de horario"],
                ["TOTAL", 2]
            ]"#,
        )
        .unwrap();
        let result =
            extract_roster(&grid, "roster.xlsx", &LayoutConfig::default(), &ShiftsConfig::default());

        assert_eq!(result.shift_records[0].assigned_names, vec!["Ana Perez", "Luis Soto"]);
        assert!(result.warnings.is_empty());
        assert_eq!(result.declared_total, Some(2));
    }

    #[test]
    fn test_footer_totals_right_or_below() {
        let result = roster(&[
            r#"[45663, 1, 1, "Ana Perez", null]"#,
            r#"["SERVICIOS SIN CONDUCTOR", null, null, null, 3]"#,
            r#"["TOTAL ASIGNADOS"]"#,
            r#"[1]"#,
        ]);
        assert_eq!(result.declared_services_without_driver, Some(3));
        assert_eq!(result.declared_total, Some(1));
    }

    #[test]
    fn test_services_without_driver_column() {
        let grid: RawCellGrid = serde_json::from_str(
            r#"[
                ["FECHA", "TURNO", "CANT", "CONDUCTOR 1", "CONDUCTOR 2", "SERV SIN CONDUCTOR"],
                [45663, 1, 2, "Ana Perez", null, 1],
                ["SERV SIN CONDUCT", 1]
            ]"#,
        )
        .unwrap();
        let result =
            extract_roster(&grid, "roster.xlsx", &LayoutConfig::default(), &ShiftsConfig::default());

        assert_eq!(result.shift_records[0].services_without_driver, 1);
        assert_eq!(result.shift_records[0].assigned_names, vec!["Ana Perez"]);
        assert_eq!(result.declared_services_without_driver, Some(1));
    }
}
