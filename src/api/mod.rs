//! HTTP API module for the roster import engine.
//!
//! This module provides the REST endpoints an interactive front end uses to
//! upload rosters, resolve names and commit imports.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{AutoApplyRequest, CreateImportRequest, RosterFileRequest, SetMappingRequest};
pub use response::{ApiError, AutoApplyResponse, ImportPreview};
pub use state::AppState;
