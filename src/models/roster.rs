//! Roster extraction models.
//!
//! This module defines the shift records pulled out of a roster sheet and the
//! per-file [`ExtractionResult`] that carries them together with diagnostics.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The period of the day a shift covers.
///
/// # Example
///
/// ```
/// use roster_import::models::ShiftType;
///
/// assert_eq!(ShiftType::Second.to_string(), "second");
/// assert_eq!(ShiftType::ALL.len(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftType {
    /// First (morning) shift.
    First,
    /// Second (afternoon) shift.
    Second,
    /// Third (night) shift.
    Third,
}

impl ShiftType {
    /// All shift types in day order.
    pub const ALL: [ShiftType; 3] = [ShiftType::First, ShiftType::Second, ShiftType::Third];

    /// Maps the ordinal used in rosters (1, 2, 3) to a shift type.
    pub fn from_ordinal(ordinal: u32) -> Option<Self> {
        match ordinal {
            1 => Some(ShiftType::First),
            2 => Some(ShiftType::Second),
            3 => Some(ShiftType::Third),
            _ => None,
        }
    }

    /// The stable identifier used in storage and JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftType::First => "first",
            ShiftType::Second => "second",
            ShiftType::Third => "third",
        }
    }
}

impl std::fmt::Display for ShiftType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ShiftType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first" => Ok(ShiftType::First),
            "second" => Ok(ShiftType::Second),
            "third" => Ok(ShiftType::Third),
            other => Err(format!("unknown shift type '{}'", other)),
        }
    }
}

/// One dated, typed shift line read from a roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftRecord {
    /// The calendar date of the shift.
    pub date: NaiveDate,
    /// Which shift of the day.
    pub shift_type: ShiftType,
    /// How many workers the roster says this shift needs.
    pub expected_count: u32,
    /// Distinct free-text names assigned, in column order.
    pub assigned_names: Vec<String>,
    /// Services the roster marks as running without a driver.
    pub services_without_driver: u32,
    /// 1-based sheet row the record came from.
    pub source_row: usize,
}

/// Identifies the kind of a per-file diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCode {
    /// No header row was found in the scanned rows.
    HeaderNotFound,
    /// The header row lacks a required column.
    MissingColumns,
    /// The footer total contradicts the extracted assignments.
    TotalMismatch,
    /// A shift lists a different number of names than it expects.
    CountMismatch,
    /// The same name appears twice on one shift row.
    DuplicateName,
    /// The footer services-without-driver total contradicts the rows.
    ServicesWithoutDriverMismatch,
    /// A date cell could not be read as a date.
    InvalidDate,
    /// A shift-type cell matched no known shift.
    UnknownShiftType,
    /// A shift row appeared before any date.
    MissingDate,
    /// Shift rows follow the row that ended the shift pass and were not read.
    RowsAfterDataEnd,
}

impl DiagnosticCode {
    /// Returns true for codes that exclude a file from commit.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DiagnosticCode::HeaderNotFound
                | DiagnosticCode::MissingColumns
                | DiagnosticCode::TotalMismatch
        )
    }
}

/// A single error or warning attached to a roster file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The kind of problem.
    pub code: DiagnosticCode,
    /// Operator-facing description.
    pub message: String,
    /// 1-based sheet row, when the problem belongs to a row.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
}

impl Diagnostic {
    /// Creates a diagnostic not tied to a row.
    pub fn new(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            row: None,
        }
    }

    /// Creates a diagnostic for a 1-based sheet row.
    pub fn at_row(code: DiagnosticCode, row: usize, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            row: Some(row),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.row {
            Some(row) => write!(f, "row {}: {}", row, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Everything extracted from one roster file.
///
/// Built once by the extractor and then annotated in place by the count
/// reconciler. A file is importable only while `errors` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Upload or file name the grid came from.
    pub source_name: String,
    /// Extracted shift lines.
    pub shift_records: Vec<ShiftRecord>,
    /// Fatal problems.
    pub errors: Vec<Diagnostic>,
    /// Advisory problems.
    pub warnings: Vec<Diagnostic>,
    /// Footer `TOTAL`, if present.
    pub declared_total: Option<u32>,
    /// Footer services-without-driver total, if present.
    pub declared_services_without_driver: Option<u32>,
}

impl ExtractionResult {
    /// Creates an empty result for a file.
    pub fn new(source_name: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            shift_records: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
            declared_total: None,
            declared_services_without_driver: None,
        }
    }

    /// Returns true when the file carries no fatal error.
    pub fn is_importable(&self) -> bool {
        self.errors.is_empty()
    }

    /// Total number of name assignments across all records.
    pub fn assigned_total(&self) -> u32 {
        self.shift_records
            .iter()
            .map(|record| record.assigned_names.len() as u32)
            .sum()
    }

    /// Sum of the per-row services-without-driver counts.
    pub fn services_without_driver_total(&self) -> u32 {
        self.shift_records
            .iter()
            .map(|record| record.services_without_driver)
            .sum()
    }

    /// Every distinct free-text name in the file, sorted.
    pub fn distinct_names(&self) -> BTreeSet<String> {
        self.shift_records
            .iter()
            .flat_map(|record| record.assigned_names.iter().cloned())
            .collect()
    }

    /// Counts warnings of one kind.
    pub fn warning_count(&self, code: DiagnosticCode) -> usize {
        self.warnings.iter().filter(|w| w.code == code).count()
    }
}
