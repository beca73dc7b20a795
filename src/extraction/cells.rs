//! Readers for individual roster cells: dates, counts and shift types.

use chrono::{Days, NaiveDate};

use crate::config::ShiftsConfig;
use crate::matching::normalize_label;
use crate::models::{CellValue, ShiftType};

/// Largest serial a spreadsheet can hold (9999-12-31).
const MAX_SPREADSHEET_SERIAL: f64 = 2_958_465.0;

// Two-digit years go first: `%Y` would read "25" as the year 25.
const TEXT_DATE_FORMATS: [&str; 5] = ["%d/%m/%y", "%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];

/// Converts a spreadsheet serial day count to a calendar date.
///
/// Serial 1 is 1900-01-01 in the 1900 date system; the epoch used here
/// (1899-12-30) absorbs the fictitious 1900-02-29, so every serial from 61 on
/// maps to the date spreadsheets display. Fractions (times of day) are dropped.
///
/// # Example
///
/// ```
/// use roster_import::extraction::excel_serial_to_date;
/// use chrono::NaiveDate;
///
/// assert_eq!(excel_serial_to_date(45663.0), NaiveDate::from_ymd_opt(2025, 1, 6));
/// assert_eq!(excel_serial_to_date(0.0), None);
/// ```
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial > MAX_SPREADSHEET_SERIAL {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_days(Days::new(serial.floor() as u64))
}

/// Parses a typed date such as `2025-01-06` or `06/01/2025`.
///
/// An ISO date-time keeps only its date part.
pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    let date_part = trimmed.split(['T', ' ']).next().unwrap_or(trimmed);
    TEXT_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date_part, format).ok())
}

/// What a date-column cell says about the current date context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateCell {
    /// Blank or zero: the previous date still applies.
    Continue,
    /// A readable date opening a new context.
    Date(NaiveDate),
    /// A non-blank value that is not a date.
    Invalid(String),
}

/// Reads a date-column cell.
pub fn read_date_cell(cell: &CellValue) -> DateCell {
    match cell {
        CellValue::Empty => DateCell::Continue,
        CellValue::Number(serial) if *serial == 0.0 => DateCell::Continue,
        CellValue::Number(serial) => excel_serial_to_date(*serial)
            .map(DateCell::Date)
            .unwrap_or_else(|| DateCell::Invalid(serial.to_string())),
        CellValue::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() || trimmed == "0" {
                return DateCell::Continue;
            }
            if let Ok(serial) = trimmed.parse::<f64>() {
                return read_date_cell(&CellValue::Number(serial));
            }
            parse_date_text(trimmed)
                .map(DateCell::Date)
                .unwrap_or_else(|| DateCell::Invalid(trimmed.to_string()))
        }
    }
}

/// Reads a non-negative whole count from a cell.
///
/// Blank, negative and non-numeric cells yield `None`.
pub fn read_count(cell: &CellValue) -> Option<u32> {
    let value = match cell {
        CellValue::Number(number) => *number,
        CellValue::Text(text) => text.trim().parse::<f64>().ok()?,
        CellValue::Empty => return None,
    };
    (value.is_finite() && value >= 0.0 && value <= u32::MAX as f64).then(|| value.round() as u32)
}

/// Returns true if the cell holds the cancellation sentinel.
pub fn is_sentinel(cell: &CellValue, sentinel: &str) -> bool {
    cell.as_text()
        .is_some_and(|text| text.eq_ignore_ascii_case(sentinel.trim()))
}

/// Identifies the shift type written in a cell.
///
/// Numeric cells use the 1/2/3 ordinal. Text matches when any of its words
/// equals a configured label of a shift type, or is a bare ordinal.
pub fn read_shift_type(cell: &CellValue, shifts: &ShiftsConfig) -> Option<ShiftType> {
    match cell {
        CellValue::Number(number) if number.fract() == 0.0 && *number >= 0.0 => {
            ShiftType::from_ordinal(*number as u32)
        }
        CellValue::Text(text) => {
            let label = normalize_label(text);
            let words: Vec<&str> = label.split(' ').collect();

            if let [single] = words.as_slice() {
                if let Some(shift_type) = single.parse::<u32>().ok().and_then(ShiftType::from_ordinal) {
                    return Some(shift_type);
                }
            }

            shifts.iter().find_map(|(shift_type, definition)| {
                definition
                    .labels
                    .iter()
                    .map(|token| normalize_label(token))
                    .any(|token| words.contains(&token.as_str()))
                    .then_some(shift_type)
            })
        }
        _ => None,
    }
}
