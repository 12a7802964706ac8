//! Handlers for the `/relationships` resource and the relationship graph.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use lorekeeper_core::types::DbId;
use lorekeeper_db::models::relationship::{
    CreateRelationship, Relationship, UpdateRelationship,
};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::services::story_bible::RelationshipGraph;
use crate::services::StoryBibleService;
use crate::state::AppState;

/// POST /api/v1/relationships
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateRelationship>,
) -> AppResult<(StatusCode, Json<DataResponse<Relationship>>)> {
    let relationship = StoryBibleService::from_state(&state)
        .create_relationship(&input)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(relationship))))
}

/// GET /api/v1/relationships
pub async fn list(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Relationship>>>> {
    let relationships = StoryBibleService::from_state(&state)
        .list_relationships()
        .await?;
    Ok(Json(DataResponse::new(relationships)))
}

/// GET /api/v1/relationships/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Relationship>>> {
    let relationship = StoryBibleService::from_state(&state)
        .get_relationship(id)
        .await?;
    Ok(Json(DataResponse::new(relationship)))
}

/// PUT /api/v1/relationships/{id}
///
/// Endpoints are fixed once created; only the descriptive fields change.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateRelationship>,
) -> AppResult<Json<DataResponse<Relationship>>> {
    let relationship = StoryBibleService::from_state(&state)
        .update_relationship(id, &input)
        .await?;
    Ok(Json(DataResponse::new(relationship)))
}

/// DELETE /api/v1/relationships/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    StoryBibleService::from_state(&state)
        .delete_relationship(id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/graph
///
/// Every character as a node and every relationship as an edge.
pub async fn graph(State(state): State<AppState>) -> AppResult<Json<DataResponse<RelationshipGraph>>> {
    let graph = StoryBibleService::from_state(&state).graph().await?;
    Ok(Json(DataResponse::new(graph)))
}
