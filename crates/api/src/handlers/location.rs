//! Handlers for the `/locations` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use lorekeeper_core::types::DbId;
use lorekeeper_db::models::location::{CreateLocation, Location, UpdateLocation};

use crate::error::AppResult;
use crate::query::ListParams;
use crate::response::DataResponse;
use crate::services::StoryBibleService;
use crate::state::AppState;

/// POST /api/v1/locations
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateLocation>,
) -> AppResult<(StatusCode, Json<DataResponse<Location>>)> {
    let location = StoryBibleService::from_state(&state)
        .create_location(&input)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(location))))
}

/// GET /api/v1/locations
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<DataResponse<Vec<Location>>>> {
    let locations = StoryBibleService::from_state(&state)
        .list_locations(params.q.as_deref(), params.limit, params.offset)
        .await?;
    Ok(Json(DataResponse::new(locations)))
}

/// GET /api/v1/locations/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Location>>> {
    let location = StoryBibleService::from_state(&state).get_location(id).await?;
    Ok(Json(DataResponse::new(location)))
}

/// PUT /api/v1/locations/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateLocation>,
) -> AppResult<Json<DataResponse<Location>>> {
    let location = StoryBibleService::from_state(&state)
        .update_location(id, &input)
        .await?;
    Ok(Json(DataResponse::new(location)))
}

/// DELETE /api/v1/locations/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    StoryBibleService::from_state(&state)
        .delete_location(id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
