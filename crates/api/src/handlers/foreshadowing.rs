//! Handlers for the `/foreshadowing` resource.
//!
//! Besides CRUD, a thread moves through its lifecycle with three actions:
//!
//! ```text
//! POST /foreshadowing/{id}/hints     reinforce an active thread
//! POST /foreshadowing/{id}/resolve   active -> resolved (pays off in a chapter)
//! POST /foreshadowing/{id}/abandon   active -> abandoned
//! ```
//!
//! Actions on a thread that is no longer active answer 409.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use lorekeeper_core::types::DbId;
use lorekeeper_db::models::foreshadowing::{
    AddHint, CreateForeshadowing, Foreshadowing, ResolveForeshadowing, UpdateForeshadowing,
};

use crate::error::AppResult;
use crate::query::StatusParams;
use crate::response::DataResponse;
use crate::services::StoryBibleService;
use crate::state::AppState;

/// POST /api/v1/foreshadowing
///
/// New threads always start `active`.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateForeshadowing>,
) -> AppResult<(StatusCode, Json<DataResponse<Foreshadowing>>)> {
    let thread = StoryBibleService::from_state(&state)
        .create_foreshadowing(&input)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(thread))))
}

/// GET /api/v1/foreshadowing
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<StatusParams>,
) -> AppResult<Json<DataResponse<Vec<Foreshadowing>>>> {
    let threads = StoryBibleService::from_state(&state)
        .list_foreshadowing(params.status.as_deref())
        .await?;
    Ok(Json(DataResponse::new(threads)))
}

/// GET /api/v1/foreshadowing/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Foreshadowing>>> {
    let thread = StoryBibleService::from_state(&state)
        .get_foreshadowing(id)
        .await?;
    Ok(Json(DataResponse::new(thread)))
}

/// PUT /api/v1/foreshadowing/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateForeshadowing>,
) -> AppResult<Json<DataResponse<Foreshadowing>>> {
    let thread = StoryBibleService::from_state(&state)
        .update_foreshadowing(id, &input)
        .await?;
    Ok(Json(DataResponse::new(thread)))
}

/// DELETE /api/v1/foreshadowing/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    StoryBibleService::from_state(&state)
        .delete_foreshadowing(id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/foreshadowing/{id}/hints
pub async fn add_hint(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<AddHint>,
) -> AppResult<Json<DataResponse<Foreshadowing>>> {
    let thread = StoryBibleService::from_state(&state)
        .add_hint(id, &input)
        .await?;
    Ok(Json(DataResponse::new(thread)))
}

/// POST /api/v1/foreshadowing/{id}/resolve
pub async fn resolve(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ResolveForeshadowing>,
) -> AppResult<Json<DataResponse<Foreshadowing>>> {
    let thread = StoryBibleService::from_state(&state)
        .resolve_foreshadowing(id, input.chapter)
        .await?;
    Ok(Json(DataResponse::new(thread)))
}

/// POST /api/v1/foreshadowing/{id}/abandon
pub async fn abandon(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Foreshadowing>>> {
    let thread = StoryBibleService::from_state(&state)
        .abandon_foreshadowing(id)
        .await?;
    Ok(Json(DataResponse::new(thread)))
}
