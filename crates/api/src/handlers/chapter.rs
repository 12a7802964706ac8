//! Handlers for the `/chapters` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use lorekeeper_core::chapter_setup::ChapterSetupSuggestions;
use lorekeeper_core::types::DbId;
use lorekeeper_db::models::chapter::{
    Chapter, ChapterSummary, CreateChapter, SaveChapterContent, UpdateChapter,
};

use crate::error::AppResult;
use crate::query::VolumeFilterParams;
use crate::response::DataResponse;
use crate::services::chapter_setup::SetupRequest;
use crate::services::{ChapterSetupService, WritingService};
use crate::state::AppState;

/// POST /api/v1/chapters
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateChapter>,
) -> AppResult<(StatusCode, Json<DataResponse<Chapter>>)> {
    let chapter = WritingService::from_state(&state)
        .create_chapter(&input)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(chapter))))
}

/// GET /api/v1/chapters
///
/// Summaries only; fetch a single chapter for its content.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<VolumeFilterParams>,
) -> AppResult<Json<DataResponse<Vec<ChapterSummary>>>> {
    let chapters = WritingService::from_state(&state)
        .list_chapters(params.volume_id)
        .await?;
    Ok(Json(DataResponse::new(chapters)))
}

/// GET /api/v1/chapters/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Chapter>>> {
    let chapter = WritingService::from_state(&state).get_chapter(id).await?;
    Ok(Json(DataResponse::new(chapter)))
}

/// PUT /api/v1/chapters/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateChapter>,
) -> AppResult<Json<DataResponse<Chapter>>> {
    let chapter = WritingService::from_state(&state)
        .update_chapter(id, &input)
        .await?;
    Ok(Json(DataResponse::new(chapter)))
}

/// PUT /api/v1/chapters/{id}/content
///
/// Replaces the body and recomputes `word_count`.
pub async fn save_content(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SaveChapterContent>,
) -> AppResult<Json<DataResponse<Chapter>>> {
    let chapter = WritingService::from_state(&state)
        .save_content(id, &input.content)
        .await?;
    Ok(Json(DataResponse::new(chapter)))
}

/// DELETE /api/v1/chapters/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    WritingService::from_state(&state).delete_chapter(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/chapters/setup-suggestions
pub async fn setup_suggestions(
    State(state): State<AppState>,
    Json(request): Json<SetupRequest>,
) -> AppResult<Json<DataResponse<ChapterSetupSuggestions>>> {
    let suggestions = ChapterSetupService::new(&state.pool)
        .suggest(&request)
        .await?;
    Ok(Json(DataResponse::new(suggestions)))
}
