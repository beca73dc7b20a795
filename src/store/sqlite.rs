//! SQLite-backed shift store.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rusqlite::{Connection, params};

use crate::error::{ImportError, ImportResult};
use crate::models::{CanonicalShift, ShiftStatus, ShiftType, Worker};

use super::ShiftStore;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A [`ShiftStore`] over a SQLite database file.
///
/// Each operation opens its own connection, so the store can be shared
/// freely across threads.
#[derive(Debug, Clone)]
pub struct SqliteShiftStore {
    db_path: PathBuf,
}

impl SqliteShiftStore {
    /// Opens the database at `db_path`, creating the file, its parent
    /// directory and the schema as needed.
    pub fn open(db_path: impl Into<PathBuf>) -> ImportResult<Self> {
        let store = Self {
            db_path: db_path.into(),
        };
        store.init()?;
        Ok(store)
    }

    /// Path of the database file.
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Adds or replaces a worker by id.
    pub fn upsert_worker(&self, worker: &Worker) -> ImportResult<()> {
        let conn = self.connect("upsert_worker")?;
        conn.execute(
            "INSERT INTO worker (id, name, is_placeholder) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name, is_placeholder = excluded.is_placeholder",
            params![worker.id, worker.name, worker.is_placeholder],
        )
        .map_err(|e| ImportError::store("upsert_worker", e))?;
        Ok(())
    }

    fn init(&self) -> ImportResult<()> {
        if let Some(parent) = self.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ImportError::store("init", e))?;
        }

        let conn = self.connect("init")?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS worker (
                id              TEXT PRIMARY KEY,
                name            TEXT NOT NULL,
                is_placeholder  INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS shift (
                worker_id   TEXT NOT NULL,
                date        TEXT NOT NULL,
                shift_type  TEXT NOT NULL,
                status      TEXT NOT NULL DEFAULT 'scheduled',
                UNIQUE (worker_id, date, shift_type)
            );

            CREATE INDEX IF NOT EXISTS idx_shift_date ON shift(date);
            ",
        )
        .map_err(|e| ImportError::store("init", e))
    }

    fn connect(&self, operation: &str) -> ImportResult<Connection> {
        Connection::open(&self.db_path).map_err(|e| ImportError::store(operation, e))
    }
}

impl ShiftStore for SqliteShiftStore {
    fn list_workers(&self) -> ImportResult<Vec<Worker>> {
        let conn = self.connect("list_workers")?;
        let mut stmt = conn
            .prepare("SELECT id, name, is_placeholder FROM worker ORDER BY id")
            .map_err(|e| ImportError::store("list_workers", e))?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Worker {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    is_placeholder: row.get(2)?,
                })
            })
            .map_err(|e| ImportError::store("list_workers", e))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| ImportError::store("list_workers", e))
    }

    fn delete_shifts_for_date(&self, date: NaiveDate) -> ImportResult<usize> {
        let conn = self.connect("delete_shifts_for_date")?;
        conn.execute(
            "DELETE FROM shift WHERE date = ?1",
            params![date.format(DATE_FORMAT).to_string()],
        )
        .map_err(|e| ImportError::store("delete_shifts_for_date", e))
    }

    fn insert_shifts(&self, shifts: &[CanonicalShift]) -> ImportResult<usize> {
        let mut conn = self.connect("insert_shifts")?;
        let tx = conn
            .transaction()
            .map_err(|e| ImportError::store("insert_shifts", e))?;

        let mut written = 0;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT OR IGNORE INTO shift (worker_id, date, shift_type, status)
                     VALUES (?1, ?2, ?3, ?4)",
                )
                .map_err(|e| ImportError::store("insert_shifts", e))?;
            for shift in shifts {
                written += stmt
                    .execute(params![
                        shift.worker_id,
                        shift.date.format(DATE_FORMAT).to_string(),
                        shift.shift_type.as_str(),
                        shift.status.as_str(),
                    ])
                    .map_err(|e| ImportError::store("insert_shifts", e))?;
            }
        }

        tx.commit()
            .map_err(|e| ImportError::store("insert_shifts", e))?;
        Ok(written)
    }

    fn shifts_for_date(&self, date: NaiveDate) -> ImportResult<Vec<CanonicalShift>> {
        let conn = self.connect("shifts_for_date")?;
        let mut stmt = conn
            .prepare("SELECT worker_id, shift_type FROM shift WHERE date = ?1")
            .map_err(|e| ImportError::store("shifts_for_date", e))?;
        let rows = stmt
            .query_map(params![date.format(DATE_FORMAT).to_string()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(|e| ImportError::store("shifts_for_date", e))?;

        let mut shifts = Vec::new();
        for row in rows {
            let (worker_id, shift_type) = row.map_err(|e| ImportError::store("shifts_for_date", e))?;
            let shift_type: ShiftType = shift_type
                .parse()
                .map_err(|e: String| ImportError::store("shifts_for_date", e))?;
            shifts.push(CanonicalShift {
                date,
                shift_type,
                worker_id,
                status: ShiftStatus::Scheduled,
            });
        }
        shifts.sort();
        Ok(shifts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> SqliteShiftStore {
        let path = std::env::temp_dir()
            .join("roster-import-tests")
            .join(format!("{}.db", uuid::Uuid::new_v4()));
        SqliteShiftStore::open(path).unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    #[test]
    fn test_workers_round_trip_with_placeholder_flag() {
        let store = temp_store();
        store.upsert_worker(&Worker::new("w1", "Ana Pérez Gómez")).unwrap();
        store
            .upsert_worker(&Worker::placeholder("w0", "Conductor Eventual"))
            .unwrap();

        let workers = store.list_workers().unwrap();
        assert_eq!(workers.len(), 2);
        assert_eq!(workers[0], Worker::placeholder("w0", "Conductor Eventual"));
        assert_eq!(workers[1].name, "Ana Pérez Gómez");
    }

    #[test]
    fn test_delete_then_insert_replaces_a_date() {
        let store = temp_store();
        store
            .insert_shifts(&[
                CanonicalShift::scheduled("w1", date(6), ShiftType::First),
                CanonicalShift::scheduled("w2", date(7), ShiftType::First),
            ])
            .unwrap();

        assert_eq!(store.delete_shifts_for_date(date(6)).unwrap(), 1);
        store
            .insert_shifts(&[CanonicalShift::scheduled("w3", date(6), ShiftType::Third)])
            .unwrap();

        let shifts = store.shifts_for_date(date(6)).unwrap();
        assert_eq!(
            shifts,
            vec![CanonicalShift::scheduled("w3", date(6), ShiftType::Third)]
        );
        assert_eq!(store.shifts_for_date(date(7)).unwrap().len(), 1);
    }

    #[test]
    fn test_unique_key_ignores_repeats() {
        let store = temp_store();
        let shift = CanonicalShift::scheduled("w1", date(6), ShiftType::First);
        assert_eq!(store.insert_shifts(&[shift.clone(), shift]).unwrap(), 1);
    }
}
