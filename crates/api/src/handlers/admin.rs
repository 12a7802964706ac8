//! Handlers for the `/admin` resource.

use axum::extract::State;
use axum::Json;
use lorekeeper_db::migrate::{applied_migrations, current_version, AppliedMigration, MIGRATIONS};
use serde::Serialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Response payload for `GET /admin/schema`.
#[derive(Debug, Serialize)]
pub struct SchemaStatus {
    pub current_version: i64,
    /// Highest version this build knows how to apply.
    pub latest_version: i64,
    pub pending: usize,
    pub applied_migrations: Vec<AppliedMigration>,
}

/// GET /api/v1/admin/schema
pub async fn schema(State(state): State<AppState>) -> AppResult<Json<DataResponse<SchemaStatus>>> {
    let current = current_version(&state.pool).await?;
    let applied = applied_migrations(&state.pool).await?;
    let latest = MIGRATIONS.last().map(|m| m.version).unwrap_or(0);
    let pending = MIGRATIONS.iter().filter(|m| m.version > current).count();

    Ok(Json(DataResponse::new(SchemaStatus {
        current_version: current,
        latest_version: latest,
        pending,
        applied_migrations: applied,
    })))
}
