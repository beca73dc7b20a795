//! Canonical worker and persisted shift models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ShiftType;

/// An authoritative worker record from the shift store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    /// Stable worker id.
    pub id: String,
    /// Registered full name.
    pub name: String,
    /// Marks the generic "unidentified / eventual" worker.
    #[serde(default)]
    pub is_placeholder: bool,
}

impl Worker {
    /// Creates a regular worker.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_placeholder: false,
        }
    }

    /// Creates the placeholder worker used when no real match exists.
    pub fn placeholder(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_placeholder: true,
        }
    }
}

/// Lifecycle status of a persisted shift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftStatus {
    /// Planned from an imported roster.
    #[default]
    Scheduled,
}

impl ShiftStatus {
    /// The stored string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftStatus::Scheduled => "scheduled",
        }
    }
}

/// A worker assigned to a dated shift, ready to persist.
///
/// Ordering is by date, then shift type, then worker, which is the order the
/// materializer hands records to the store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CanonicalShift {
    /// Calendar date.
    pub date: NaiveDate,
    /// Shift of the day.
    pub shift_type: ShiftType,
    /// Canonical worker id.
    pub worker_id: String,
    /// Always `scheduled` for imported shifts.
    #[serde(default)]
    pub status: ShiftStatus,
}

impl CanonicalShift {
    /// Creates a scheduled shift.
    pub fn scheduled(worker_id: impl Into<String>, date: NaiveDate, shift_type: ShiftType) -> Self {
        Self {
            date,
            shift_type,
            worker_id: worker_id.into(),
            status: ShiftStatus::Scheduled,
        }
    }
}
