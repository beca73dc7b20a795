//! HTTP request handlers for the roster import API.
//!
//! This module contains the handler functions for all API endpoints.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ImportError, ImportResult};
use crate::import::{ImportBatch, ImportCoordinator, RosterFile};
use crate::models::Worker;

use super::request::{AutoApplyRequest, CreateImportRequest, SetMappingRequest};
use super::response::{ApiError, ApiErrorResponse, AutoApplyResponse, ImportPreview};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/imports", post(create_import))
        .route("/imports/:id", get(get_import).delete(cancel_import))
        .route("/imports/:id/auto-apply", post(auto_apply))
        .route("/imports/:id/mappings", put(set_mapping))
        .route("/imports/:id/commit", post(commit_import))
        .with_state(state)
}

/// Handler for `POST /imports`.
///
/// Extracts and reconciles the uploaded rosters and opens a mapping session.
async fn create_import(
    State(state): State<AppState>,
    payload: Result<Json<CreateImportRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing import upload");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let files: Vec<RosterFile> = request.files.into_iter().map(Into::into).collect();
    let coordinator = state.coordinator();
    let batch = coordinator.prepare(files);

    let result = coordinator.workers().and_then(|workers| {
        let id = state.open_session(batch)?;
        state.with_session(id, |batch| Ok(build_preview(coordinator, id, batch, &workers)))
    });

    match result {
        Ok(preview) => {
            info!(
                correlation_id = %correlation_id,
                import_id = %preview.import_id,
                files = preview.files.len(),
                distinct_names = preview.distinct_names.len(),
                "Import session opened"
            );
            json_response(StatusCode::CREATED, preview)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for `GET /imports/:id`.
async fn get_import(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let correlation_id = Uuid::new_v4();
    let coordinator = state.coordinator();
    let result = parse_import_id(&id).and_then(|id| {
        let workers = coordinator.workers()?;
        state.with_session(id, |batch| Ok(build_preview(coordinator, id, batch, &workers)))
    });

    match result {
        Ok(preview) => json_response(StatusCode::OK, preview),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for `POST /imports/:id/auto-apply`.
///
/// The body is optional; without a threshold the configured default applies.
async fn auto_apply(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let request = if body.iter().all(u8::is_ascii_whitespace) {
        AutoApplyRequest::default()
    } else {
        match serde_json::from_slice::<AutoApplyRequest>(&body) {
            Ok(request) => request,
            Err(err) => {
                warn!(correlation_id = %correlation_id, error = %err, "Invalid auto-apply body");
                return ApiErrorResponse::bad_request(ApiError::malformed_json(err.to_string()))
                    .into_response();
            }
        }
    };

    let coordinator = state.coordinator();
    let result = parse_import_id(&id).and_then(|id| {
        let workers = coordinator.workers()?;
        state.with_session(id, |batch| {
            let applied = coordinator.auto_apply_with(batch, &workers, request.threshold);
            Ok(AutoApplyResponse {
                applied,
                preview: build_preview(coordinator, id, batch, &workers),
            })
        })
    });

    match result {
        Ok(response) => {
            info!(
                correlation_id = %correlation_id,
                import_id = %response.preview.import_id,
                applied = response.applied,
                mapped = response.preview.stats.mapped_names,
                "Suggestions auto-applied"
            );
            json_response(StatusCode::OK, response)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for `PUT /imports/:id/mappings`.
async fn set_mapping(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<SetMappingRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let coordinator = state.coordinator();
    let result = parse_import_id(&id).and_then(|id| {
        let workers = coordinator.workers()?;
        state.with_session(id, |batch| {
            coordinator.set_mapping_with(
                batch,
                &workers,
                &request.name,
                request.worker_id.as_deref(),
            )?;
            Ok(build_preview(coordinator, id, batch, &workers))
        })
    });

    match result {
        Ok(preview) => json_response(StatusCode::OK, preview),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for `POST /imports/:id/commit`.
///
/// The session is taken out of the table for the commit, so a concurrent
/// commit of the same import finds nothing. A successful commit closes it; a
/// failed one puts it back.
async fn commit_import(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let correlation_id = Uuid::new_v4();

    let result = parse_import_id(&id).and_then(|id| {
        let batch = state.take_session(id)?;
        match state.coordinator().commit(&batch) {
            Ok(report) => Ok(report),
            Err(err) => {
                state.restore_session(id, batch)?;
                Err(err)
            }
        }
    });

    match result {
        Ok(report) => {
            info!(
                correlation_id = %correlation_id,
                import_id = %report.import_id,
                shifts_imported = report.shifts_imported,
                shifts_skipped = report.shifts_skipped,
                duration_us = report.audit_trace.duration_us,
                "Import committed"
            );
            json_response(StatusCode::OK, report)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for `DELETE /imports/:id`. Discards the session without writing.
async fn cancel_import(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let correlation_id = Uuid::new_v4();

    let result = parse_import_id(&id).and_then(|id| {
        if state.close_session(id)? {
            Ok(id)
        } else {
            Err(ImportError::SessionNotFound {
                session_id: id.to_string(),
            })
        }
    });

    match result {
        Ok(id) => {
            info!(correlation_id = %correlation_id, import_id = %id, "Import cancelled");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(err) => error_response(correlation_id, err),
    }
}

fn parse_import_id(id: &str) -> ImportResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| ImportError::SessionNotFound {
        session_id: id.to_string(),
    })
}

fn build_preview(
    coordinator: &ImportCoordinator,
    import_id: Uuid,
    batch: &ImportBatch,
    workers: &[Worker],
) -> ImportPreview {
    let session = batch.session();
    ImportPreview {
        import_id,
        files: coordinator.file_reports(batch),
        distinct_names: session.distinct_names().to_vec(),
        suggestions: coordinator.suggest_with(batch, workers),
        mapping: session.mapping().clone(),
        unmapped_names: session
            .unmapped_names()
            .into_iter()
            .map(String::from)
            .collect(),
        stats: batch.stats(),
        can_proceed: session.can_proceed(),
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(correlation_id: Uuid, err: ImportError) -> Response {
    warn!(correlation_id = %correlation_id, error = %err, "Import request failed");
    let api_error: ApiErrorResponse = err.into();
    (
        api_error.status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(api_error.error),
    )
        .into_response()
}

fn rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::new("VALIDATION_ERROR", body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    json_response(StatusCode::BAD_REQUEST, error)
}
