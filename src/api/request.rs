//! Request types for the roster import API.

use serde::{Deserialize, Serialize};

use crate::import::RosterFile;
use crate::models::RawCellGrid;

/// Request body for `POST /imports`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateImportRequest {
    /// The uploaded rosters, each already read into a cell grid.
    pub files: Vec<RosterFileRequest>,
}

/// One roster in a create-import request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterFileRequest {
    /// File name shown to the operator.
    pub name: String,
    /// First-sheet rows; cells are `null`, numbers or strings.
    pub rows: RawCellGrid,
}

impl From<RosterFileRequest> for RosterFile {
    fn from(req: RosterFileRequest) -> Self {
        RosterFile::new(req.name, req.rows)
    }
}

/// Request body for `POST /imports/:id/auto-apply`. The body may be omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutoApplyRequest {
    /// Lowest score applied; the configured default when absent.
    #[serde(default)]
    pub threshold: Option<f64>,
}

/// Request body for `PUT /imports/:id/mappings`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetMappingRequest {
    /// The free-text roster name.
    pub name: String,
    /// The canonical worker, or `null` to clear the mapping.
    #[serde(default)]
    pub worker_id: Option<String>,
}
