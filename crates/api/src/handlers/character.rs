//! Handlers for the `/characters` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use lorekeeper_core::types::DbId;
use lorekeeper_db::models::character::{Character, CreateCharacter, UpdateCharacter};
use lorekeeper_db::models::relationship::Relationship;

use crate::error::AppResult;
use crate::query::ListParams;
use crate::response::DataResponse;
use crate::services::StoryBibleService;
use crate::state::AppState;

/// POST /api/v1/characters
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateCharacter>,
) -> AppResult<(StatusCode, Json<DataResponse<Character>>)> {
    let character = StoryBibleService::from_state(&state)
        .create_character(&input)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(character))))
}

/// GET /api/v1/characters
///
/// With a non-blank `q` this becomes a name search.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<DataResponse<Vec<Character>>>> {
    let characters = StoryBibleService::from_state(&state)
        .list_characters(params.q.as_deref(), params.limit, params.offset)
        .await?;
    Ok(Json(DataResponse::new(characters)))
}

/// GET /api/v1/characters/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Character>>> {
    let character = StoryBibleService::from_state(&state).get_character(id).await?;
    Ok(Json(DataResponse::new(character)))
}

/// PUT /api/v1/characters/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCharacter>,
) -> AppResult<Json<DataResponse<Character>>> {
    let character = StoryBibleService::from_state(&state)
        .update_character(id, &input)
        .await?;
    Ok(Json(DataResponse::new(character)))
}

/// DELETE /api/v1/characters/{id}
///
/// Relationships of the character are removed with it.
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    StoryBibleService::from_state(&state)
        .delete_character(id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/characters/{id}/relationships
pub async fn list_relationships(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Relationship>>>> {
    let relationships = StoryBibleService::from_state(&state)
        .list_relationships_for_character(id)
        .await?;
    Ok(Json(DataResponse::new(relationships)))
}
