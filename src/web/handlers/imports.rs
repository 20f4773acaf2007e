//! Import handlers for Web API.

use axum::{extract::State, http::StatusCode};
use std::sync::Arc;

use crate::import::{ImportLimits, ImportService};
use crate::web::dto::{ImportRequest, ValidatedJson};
use crate::web::error::ApiError;
use crate::Database;

/// Shared database handle for Web API.
pub type SharedDatabase = Arc<Database>;

/// Application state shared across handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: SharedDatabase,
    /// Batch sizes computed at startup.
    pub limits: ImportLimits,
}

impl AppState {
    /// Create a new application state.
    pub fn new(db: SharedDatabase, limits: ImportLimits) -> Self {
        Self { db, limits }
    }
}

/// POST /imports - Store a batch of files and folders.
///
/// Every item lands or none does. Responds `201 Created` with an empty
/// body on success.
pub async fn post_imports(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<ImportRequest>,
) -> Result<StatusCode, ApiError> {
    let (items, update_date) = req.into_import()?;

    let service = ImportService::new(&state.db, state.limits);
    service.import(&items, update_date).await?;

    Ok(StatusCode::CREATED)
}
