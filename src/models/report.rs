//! Import report models.
//!
//! This module contains the [`ImportReport`] returned to the operator after a
//! commit, the per-file [`FileReport`], the per-name and per-worker shift
//! tallies, and the audit trace recording each pipeline step.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Diagnostic, ShiftType};

/// Shift counts and nominal hours for one name or worker.
///
/// # Example
///
/// ```
/// use roster_import::models::{ShiftTally, ShiftType};
/// use rust_decimal::Decimal;
///
/// let mut tally = ShiftTally::default();
/// tally.add(ShiftType::First, Decimal::new(8, 0));
/// tally.add(ShiftType::Third, Decimal::new(8, 0));
/// assert_eq!(tally.total_shifts, 2);
/// assert_eq!(tally.hours, Decimal::new(16, 0));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftTally {
    /// Number of shifts.
    pub total_shifts: u32,
    /// Number of shifts per shift type.
    pub by_shift_type: BTreeMap<ShiftType, u32>,
    /// Sum of the nominal hours of those shifts.
    pub hours: Decimal,
}

impl ShiftTally {
    /// Counts one shift of the given type.
    pub fn add(&mut self, shift_type: ShiftType, hours: Decimal) {
        self.total_shifts += 1;
        *self.by_shift_type.entry(shift_type).or_insert(0) += 1;
        self.hours += hours;
    }
}

/// Shift tally for one free-text roster name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameShiftSummary {
    /// The name as typed in the roster.
    pub name: String,
    /// Shifts listing this name.
    pub tally: ShiftTally,
}

/// Shift tally for one canonical worker in a committed import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerShiftSummary {
    /// Canonical worker id.
    pub worker_id: String,
    /// Registered worker name, when the worker list knows it.
    pub worker_name: Option<String>,
    /// Imported shifts for this worker.
    pub tally: ShiftTally,
}

/// Diagnostic detail for one uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    /// Upload or file name.
    pub source_name: String,
    /// True when the file has no fatal error.
    pub importable: bool,
    /// Fatal problems.
    pub errors: Vec<Diagnostic>,
    /// Advisory problems.
    pub warnings: Vec<Diagnostic>,
    /// Number of shift records extracted.
    pub shift_record_count: usize,
    /// Number of name assignments extracted.
    pub assigned_total: u32,
    /// Footer total, if declared.
    pub declared_total: Option<u32>,
    /// Per-name statistics; empty for files that are not importable.
    pub name_summaries: Vec<NameShiftSummary>,
}

/// A single step in the audit trace recording a pipeline decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// Identifier of the pipeline rule applied.
    pub rule_id: String,
    /// Human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// The complete audit trace for an import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of pipeline steps.
    pub steps: Vec<AuditStep>,
    /// Total pipeline duration in microseconds.
    pub duration_us: u64,
}

/// The outcome of a committed import, for operator review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Unique id of this import run.
    pub import_id: Uuid,
    /// When the commit finished.
    pub timestamp: DateTime<Utc>,
    /// Crate version that produced the report.
    pub engine_version: String,
    /// Per-file diagnostics, in upload order.
    pub files: Vec<FileReport>,
    /// Number of files processed.
    pub files_processed: usize,
    /// Number of files whose shifts were committed.
    pub files_imported: usize,
    /// Canonical shifts written to the store.
    pub shifts_imported: usize,
    /// Assignments dropped because their name was never mapped.
    pub shifts_skipped: usize,
    /// The unmapped names behind `shifts_skipped`.
    pub skipped_names: Vec<String>,
    /// Dates whose shifts were replaced.
    pub dates_affected: Vec<NaiveDate>,
    /// Per-worker totals of the committed shifts.
    pub worker_summaries: Vec<WorkerShiftSummary>,
    /// Step-by-step trace of the pipeline.
    pub audit_trace: AuditTrace,
}
