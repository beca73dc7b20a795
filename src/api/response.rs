//! Response types for the roster import API.
//!
//! This module defines the import preview returned while names are being
//! resolved, and the error responses of the HTTP API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ImportError;
use crate::matching::MappingStats;
use crate::models::{FileReport, MatchSuggestion, WorkerMapping};

/// State of an open import, shown to the operator before commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportPreview {
    /// Session id used in later requests.
    pub import_id: Uuid,
    /// Per-file diagnostics and name statistics.
    pub files: Vec<FileReport>,
    /// Distinct free-text names across the importable files.
    pub distinct_names: Vec<String>,
    /// One suggestion per name that has one.
    pub suggestions: Vec<MatchSuggestion>,
    /// The current name to worker mapping.
    pub mapping: WorkerMapping,
    /// Names still without a worker.
    pub unmapped_names: Vec<String>,
    /// Mapping statistics.
    pub stats: MappingStats,
    /// Whether a commit would be accepted.
    pub can_proceed: bool,
}

/// Response body for `POST /imports/:id/auto-apply`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoApplyResponse {
    /// Mappings written by this call.
    pub applied: usize,
    /// The preview after applying.
    pub preview: ImportPreview,
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// A 400 response for a body that is not valid JSON for the endpoint.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<ImportError> for ApiErrorResponse {
    fn from(error: ImportError) -> Self {
        let message = error.to_string();
        let (status, error) = match error {
            ImportError::ConfigNotFound { .. } | ImportError::ConfigParseError { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
            ),
            ImportError::WorkbookError { .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::new("WORKBOOK_ERROR", message),
            ),
            ImportError::UnknownName { .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::with_details(
                    "UNKNOWN_NAME",
                    message,
                    "Only names read from the uploaded rosters can be mapped",
                ),
            ),
            ImportError::UnknownWorker { .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::new("UNKNOWN_WORKER", message),
            ),
            ImportError::ProceedBlocked => (
                StatusCode::CONFLICT,
                ApiError::with_details(
                    "PROCEED_BLOCKED",
                    message,
                    "Map at least one roster name to a worker before committing",
                ),
            ),
            ImportError::SessionNotFound { .. } => (
                StatusCode::NOT_FOUND,
                ApiError::new("SESSION_NOT_FOUND", message),
            ),
            ImportError::Store { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("STORE_ERROR", "Shift store error", message),
            ),
        };
        ApiErrorResponse { status, error }
    }
}
