//! The shift store: where canonical workers live and committed shifts land.
//!
//! Imports only need four operations from the store. Deleting a date and
//! inserting its new shifts are separate calls; the importer never wraps
//! the pair in a transaction.

mod memory;
mod sqlite;

use chrono::NaiveDate;

use crate::error::ImportResult;
use crate::models::{CanonicalShift, Worker};

pub use memory::InMemoryShiftStore;
pub use sqlite::SqliteShiftStore;

/// Persistence operations used by the import coordinator.
pub trait ShiftStore: Send + Sync {
    /// All canonical workers, placeholders included.
    fn list_workers(&self) -> ImportResult<Vec<Worker>>;

    /// Removes every shift on `date`, returning how many were removed.
    fn delete_shifts_for_date(&self, date: NaiveDate) -> ImportResult<usize>;

    /// Inserts shifts, returning how many were written.
    fn insert_shifts(&self, shifts: &[CanonicalShift]) -> ImportResult<usize>;

    /// Shifts stored for `date`, ordered by shift type then worker.
    fn shifts_for_date(&self, date: NaiveDate) -> ImportResult<Vec<CanonicalShift>>;
}
