//! Handlers for the `/hooks` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use lorekeeper_core::types::DbId;
use lorekeeper_db::models::hook::{CreateHook, Hook, UpdateHook};

use crate::error::AppResult;
use crate::query::ChapterFilterParams;
use crate::response::DataResponse;
use crate::services::StoryBibleService;
use crate::state::AppState;

/// POST /api/v1/hooks
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateHook>,
) -> AppResult<(StatusCode, Json<DataResponse<Hook>>)> {
    let hook = StoryBibleService::from_state(&state).create_hook(&input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(hook))))
}

/// GET /api/v1/hooks
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ChapterFilterParams>,
) -> AppResult<Json<DataResponse<Vec<Hook>>>> {
    let hooks = StoryBibleService::from_state(&state)
        .list_hooks(params.chapter_id)
        .await?;
    Ok(Json(DataResponse::new(hooks)))
}

/// GET /api/v1/hooks/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Hook>>> {
    let hook = StoryBibleService::from_state(&state).get_hook(id).await?;
    Ok(Json(DataResponse::new(hook)))
}

/// PUT /api/v1/hooks/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateHook>,
) -> AppResult<Json<DataResponse<Hook>>> {
    let hook = StoryBibleService::from_state(&state)
        .update_hook(id, &input)
        .await?;
    Ok(Json(DataResponse::new(hook)))
}

/// DELETE /api/v1/hooks/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    StoryBibleService::from_state(&state).delete_hook(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
