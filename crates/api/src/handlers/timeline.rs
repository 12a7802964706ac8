//! Handlers for the `/timeline` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use lorekeeper_core::types::DbId;
use lorekeeper_db::models::timeline::{
    CreateTimelineEvent, TimelineEvent, UpdateTimelineEvent,
};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::services::StoryBibleService;
use crate::state::AppState;

/// POST /api/v1/timeline
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateTimelineEvent>,
) -> AppResult<(StatusCode, Json<DataResponse<TimelineEvent>>)> {
    let event = StoryBibleService::from_state(&state)
        .create_timeline_event(&input)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(event))))
}

/// GET /api/v1/timeline
pub async fn list(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<TimelineEvent>>>> {
    let events = StoryBibleService::from_state(&state).list_timeline().await?;
    Ok(Json(DataResponse::new(events)))
}

/// GET /api/v1/timeline/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<TimelineEvent>>> {
    let event = StoryBibleService::from_state(&state)
        .get_timeline_event(id)
        .await?;
    Ok(Json(DataResponse::new(event)))
}

/// PUT /api/v1/timeline/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTimelineEvent>,
) -> AppResult<Json<DataResponse<TimelineEvent>>> {
    let event = StoryBibleService::from_state(&state)
        .update_timeline_event(id, &input)
        .await?;
    Ok(Json(DataResponse::new(event)))
}

/// DELETE /api/v1/timeline/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    StoryBibleService::from_state(&state)
        .delete_timeline_event(id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
