//! In-memory shift store.

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;

use crate::error::{ImportError, ImportResult};
use crate::models::{CanonicalShift, Worker};

use super::ShiftStore;

#[derive(Debug, Default)]
struct Tables {
    workers: Vec<Worker>,
    shifts: BTreeSet<CanonicalShift>,
}

/// A [`ShiftStore`] kept in process memory.
///
/// # Example
///
/// ```
/// use roster_import::models::Worker;
/// use roster_import::store::{InMemoryShiftStore, ShiftStore};
///
/// let store = InMemoryShiftStore::with_workers(vec![Worker::new("w1", "Ana Pérez Gómez")]);
/// assert_eq!(store.list_workers().unwrap().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryShiftStore {
    tables: Mutex<Tables>,
}

impl InMemoryShiftStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the given workers.
    pub fn with_workers(workers: Vec<Worker>) -> Self {
        Self {
            tables: Mutex::new(Tables {
                workers,
                shifts: BTreeSet::new(),
            }),
        }
    }

    /// Adds or replaces a worker by id.
    pub fn upsert_worker(&self, worker: Worker) -> ImportResult<()> {
        let mut tables = self.lock("upsert_worker")?;
        match tables.workers.iter_mut().find(|w| w.id == worker.id) {
            Some(existing) => *existing = worker,
            None => tables.workers.push(worker),
        }
        Ok(())
    }

    /// Every stored shift, ordered by date.
    pub fn all_shifts(&self) -> ImportResult<Vec<CanonicalShift>> {
        Ok(self.lock("all_shifts")?.shifts.iter().cloned().collect())
    }

    fn lock(&self, operation: &str) -> ImportResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| ImportError::store(operation, "store mutex poisoned"))
    }
}

impl ShiftStore for InMemoryShiftStore {
    fn list_workers(&self) -> ImportResult<Vec<Worker>> {
        Ok(self.lock("list_workers")?.workers.clone())
    }

    fn delete_shifts_for_date(&self, date: NaiveDate) -> ImportResult<usize> {
        let mut tables = self.lock("delete_shifts_for_date")?;
        let before = tables.shifts.len();
        tables.shifts.retain(|shift| shift.date != date);
        Ok(before - tables.shifts.len())
    }

    fn insert_shifts(&self, shifts: &[CanonicalShift]) -> ImportResult<usize> {
        let mut tables = self.lock("insert_shifts")?;
        Ok(shifts
            .iter()
            .filter(|shift| tables.shifts.insert((*shift).clone()))
            .count())
    }

    fn shifts_for_date(&self, date: NaiveDate) -> ImportResult<Vec<CanonicalShift>> {
        Ok(self
            .lock("shifts_for_date")?
            .shifts
            .iter()
            .filter(|shift| shift.date == date)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ShiftType;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    #[test]
    fn test_delete_only_touches_one_date() {
        let store = InMemoryShiftStore::new();
        store
            .insert_shifts(&[
                CanonicalShift::scheduled("w1", date(6), ShiftType::First),
                CanonicalShift::scheduled("w2", date(6), ShiftType::Second),
                CanonicalShift::scheduled("w1", date(7), ShiftType::First),
            ])
            .unwrap();

        assert_eq!(store.delete_shifts_for_date(date(6)).unwrap(), 2);
        assert!(store.shifts_for_date(date(6)).unwrap().is_empty());
        assert_eq!(store.shifts_for_date(date(7)).unwrap().len(), 1);
    }

    #[test]
    fn test_insert_keeps_shifts_unique() {
        let store = InMemoryShiftStore::new();
        let shift = CanonicalShift::scheduled("w1", date(6), ShiftType::First);
        assert_eq!(store.insert_shifts(&[shift.clone(), shift.clone()]).unwrap(), 1);
        assert_eq!(store.insert_shifts(&[shift]).unwrap(), 0);
        assert_eq!(store.all_shifts().unwrap().len(), 1);
    }

    #[test]
    fn test_upsert_worker_replaces_by_id() {
        let store = InMemoryShiftStore::new();
        store.upsert_worker(Worker::new("w1", "Ana Perez")).unwrap();
        store
            .upsert_worker(Worker::new("w1", "Ana Pérez Gómez"))
            .unwrap();

        let workers = store.list_workers().unwrap();
        assert_eq!(workers.len(), 1);
        assert_eq!(workers[0].name, "Ana Pérez Gómez");
    }
}
