//! Handlers for the `/arcs` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use lorekeeper_core::types::DbId;
use lorekeeper_db::models::arc::{CreateArc, StoryArc, UpdateArc};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::services::StoryBibleService;
use crate::state::AppState;

/// POST /api/v1/arcs
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateArc>,
) -> AppResult<(StatusCode, Json<DataResponse<StoryArc>>)> {
    let arc = StoryBibleService::from_state(&state).create_arc(&input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(arc))))
}

/// GET /api/v1/arcs
pub async fn list(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<StoryArc>>>> {
    let arcs = StoryBibleService::from_state(&state).list_arcs().await?;
    Ok(Json(DataResponse::new(arcs)))
}

/// GET /api/v1/arcs/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<StoryArc>>> {
    let arc = StoryBibleService::from_state(&state).get_arc(id).await?;
    Ok(Json(DataResponse::new(arc)))
}

/// PUT /api/v1/arcs/{id}
///
/// A one-sided chapter range is checked against the stored other side.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateArc>,
) -> AppResult<Json<DataResponse<StoryArc>>> {
    let arc = StoryBibleService::from_state(&state)
        .update_arc(id, &input)
        .await?;
    Ok(Json(DataResponse::new(arc)))
}

/// DELETE /api/v1/arcs/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    StoryBibleService::from_state(&state).delete_arc(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
