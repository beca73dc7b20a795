//! Error types for the roster import engine.
//!
//! Per-file problems found while reading a roster are not errors in this
//! sense: they travel as [`Diagnostic`](crate::models::Diagnostic) values inside
//! an [`ExtractionResult`](crate::models::ExtractionResult). The variants here
//! cover the conditions that stop an operation outright.

use thiserror::Error;

/// The main error type for the roster import engine.
///
/// # Example
///
/// ```
/// use roster_import::error::ImportError;
///
/// let error = ImportError::UnknownName {
///     name: "Ana Perez".to_string(),
/// };
/// assert_eq!(error.to_string(), "Name not present in the import session: Ana Perez");
/// ```
#[derive(Debug, Error)]
pub enum ImportError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A roster workbook could not be opened or has no readable sheet.
    #[error("Failed to read workbook '{path}': {message}")]
    WorkbookError {
        /// The path or upload name of the workbook.
        path: String,
        /// A description of the failure.
        message: String,
    },

    /// A manual mapping referenced a free-text name the session does not hold.
    #[error("Name not present in the import session: {name}")]
    UnknownName {
        /// The free-text name.
        name: String,
    },

    /// A manual mapping referenced a worker id that is not in the worker list.
    #[error("Worker not found: {worker_id}")]
    UnknownWorker {
        /// The canonical worker id.
        worker_id: String,
    },

    /// No free-text name is mapped, so nothing can be committed.
    #[error("Import blocked: no roster name is mapped to a worker")]
    ProceedBlocked,

    /// An import session id did not resolve to a live session.
    #[error("Import session not found: {session_id}")]
    SessionNotFound {
        /// The session id that was requested.
        session_id: String,
    },

    /// The shift store rejected an operation.
    #[error("Store operation '{operation}' failed: {message}")]
    Store {
        /// The store operation that failed.
        operation: String,
        /// A description of the failure.
        message: String,
    },
}

impl ImportError {
    /// Builds a [`ImportError::Store`] from any displayable cause.
    pub fn store(operation: &str, cause: impl std::fmt::Display) -> Self {
        ImportError::Store {
            operation: operation.to_string(),
            message: cause.to_string(),
        }
    }
}

/// A type alias for Results that return ImportError.
pub type ImportResult<T> = Result<T, ImportError>;
