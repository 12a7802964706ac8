//! Handlers for the singleton `/world` resource.

use axum::extract::State;
use axum::Json;
use lorekeeper_db::models::world::UpdateWorld;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::services::story_bible::WorldSettings;
use crate::services::StoryBibleService;
use crate::state::AppState;

/// GET /api/v1/world
///
/// Returns empty settings (and a null `updated_at`) before the first save.
pub async fn get(State(state): State<AppState>) -> AppResult<Json<DataResponse<WorldSettings>>> {
    let world = StoryBibleService::from_state(&state).get_world().await?;
    Ok(Json(DataResponse::new(world)))
}

/// PUT /api/v1/world
pub async fn update(
    State(state): State<AppState>,
    Json(input): Json<UpdateWorld>,
) -> AppResult<Json<DataResponse<WorldSettings>>> {
    let world = StoryBibleService::from_state(&state)
        .update_world(&input)
        .await?;
    Ok(Json(DataResponse::new(world)))
}
