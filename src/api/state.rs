//! Application state for the roster import API.
//!
//! This module defines the shared state available to all request handlers:
//! the import coordinator and the open import sessions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

use crate::config::ConfigLoader;
use crate::error::{ImportError, ImportResult};
use crate::import::{ImportBatch, ImportCoordinator};
use crate::store::ShiftStore;

/// Shared application state.
///
/// Open imports live here until they are committed or cancelled; nothing
/// about them reaches the store before commit.
#[derive(Clone)]
pub struct AppState {
    coordinator: Arc<ImportCoordinator>,
    sessions: Arc<Mutex<HashMap<Uuid, ImportBatch>>>,
}

impl AppState {
    /// Creates the state from a loaded configuration and a shift store.
    pub fn new(config: ConfigLoader, store: Arc<dyn ShiftStore>) -> Self {
        Self {
            coordinator: Arc::new(ImportCoordinator::new(config.config().clone(), store)),
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the import coordinator.
    pub fn coordinator(&self) -> &ImportCoordinator {
        &self.coordinator
    }

    /// Stores a new import session and returns its id.
    pub fn open_session(&self, batch: ImportBatch) -> ImportResult<Uuid> {
        let id = Uuid::new_v4();
        self.lock()?.insert(id, batch);
        Ok(id)
    }

    /// Runs `f` against an open session while holding the session table.
    ///
    /// `f` must not touch the shift store; fetch workers before calling.
    pub fn with_session<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut ImportBatch) -> ImportResult<T>,
    ) -> ImportResult<T> {
        let mut sessions = self.lock()?;
        let batch = sessions
            .get_mut(&id)
            .ok_or_else(|| ImportError::SessionNotFound {
                session_id: id.to_string(),
            })?;
        f(batch)
    }

    /// Removes a session and hands it to the caller.
    ///
    /// A second caller for the same id gets `SessionNotFound` until the batch
    /// is put back with [`restore_session`](Self::restore_session).
    pub fn take_session(&self, id: Uuid) -> ImportResult<ImportBatch> {
        self.lock()?
            .remove(&id)
            .ok_or_else(|| ImportError::SessionNotFound {
                session_id: id.to_string(),
            })
    }

    /// Puts a taken session back under its id.
    pub fn restore_session(&self, id: Uuid, batch: ImportBatch) -> ImportResult<()> {
        self.lock()?.insert(id, batch);
        Ok(())
    }

    /// Discards a session; returns false if it was not open.
    pub fn close_session(&self, id: Uuid) -> ImportResult<bool> {
        Ok(self.lock()?.remove(&id).is_some())
    }

    fn lock(&self) -> ImportResult<MutexGuard<'_, HashMap<Uuid, ImportBatch>>> {
        self.sessions
            .lock()
            .map_err(|_| ImportError::store("sessions", "session table poisoned"))
    }
}
