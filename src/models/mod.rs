//! Core data models for the roster import engine.
//!
//! This module contains all the domain models used throughout the engine.

mod cell;
mod mapping;
mod report;
mod roster;
mod worker;

pub use cell::{CellValue, RawCellGrid};
pub use mapping::{MatchSuggestion, WorkerMapping};
pub use report::{
    AuditStep, AuditTrace, FileReport, ImportReport, NameShiftSummary, ShiftTally,
    WorkerShiftSummary,
};
pub use roster::{Diagnostic, DiagnosticCode, ExtractionResult, ShiftRecord, ShiftType};
pub use worker::{CanonicalShift, ShiftStatus, Worker};
