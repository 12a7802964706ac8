//! Handlers for the `/factions` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use lorekeeper_core::types::DbId;
use lorekeeper_db::models::faction::{CreateFaction, Faction, UpdateFaction};

use crate::error::AppResult;
use crate::query::ListParams;
use crate::response::DataResponse;
use crate::services::StoryBibleService;
use crate::state::AppState;

/// POST /api/v1/factions
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateFaction>,
) -> AppResult<(StatusCode, Json<DataResponse<Faction>>)> {
    let faction = StoryBibleService::from_state(&state)
        .create_faction(&input)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(faction))))
}

/// GET /api/v1/factions
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<DataResponse<Vec<Faction>>>> {
    let factions = StoryBibleService::from_state(&state)
        .list_factions(params.q.as_deref(), params.limit, params.offset)
        .await?;
    Ok(Json(DataResponse::new(factions)))
}

/// GET /api/v1/factions/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Faction>>> {
    let faction = StoryBibleService::from_state(&state).get_faction(id).await?;
    Ok(Json(DataResponse::new(faction)))
}

/// PUT /api/v1/factions/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateFaction>,
) -> AppResult<Json<DataResponse<Faction>>> {
    let faction = StoryBibleService::from_state(&state)
        .update_faction(id, &input)
        .await?;
    Ok(Json(DataResponse::new(faction)))
}

/// DELETE /api/v1/factions/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    StoryBibleService::from_state(&state)
        .delete_faction(id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
