//! Handlers for the `/volumes` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use lorekeeper_core::types::DbId;
use lorekeeper_db::models::volume::{CreateVolume, UpdateVolume, Volume};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::services::WritingService;
use crate::state::AppState;

/// POST /api/v1/volumes
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateVolume>,
) -> AppResult<(StatusCode, Json<DataResponse<Volume>>)> {
    let volume = WritingService::from_state(&state).create_volume(&input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(volume))))
}

/// GET /api/v1/volumes
pub async fn list(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Volume>>>> {
    let volumes = WritingService::from_state(&state).list_volumes().await?;
    Ok(Json(DataResponse::new(volumes)))
}

/// GET /api/v1/volumes/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Volume>>> {
    let volume = WritingService::from_state(&state).get_volume(id).await?;
    Ok(Json(DataResponse::new(volume)))
}

/// PUT /api/v1/volumes/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateVolume>,
) -> AppResult<Json<DataResponse<Volume>>> {
    let volume = WritingService::from_state(&state)
        .update_volume(id, &input)
        .await?;
    Ok(Json(DataResponse::new(volume)))
}

/// DELETE /api/v1/volumes/{id}
///
/// Chapters of the volume are kept and detached.
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    WritingService::from_state(&state).delete_volume(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
