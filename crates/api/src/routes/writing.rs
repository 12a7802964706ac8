//! Route definitions for volumes and chapters.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{chapter, volume};
use crate::state::AppState;

/// Routes mounted at the `/api/v1` root.
///
/// ```text
/// GET    /volumes                            -> volume::list
/// POST   /volumes                            -> volume::create
/// GET    /volumes/{id}                       -> volume::get_by_id
/// PUT    /volumes/{id}                       -> volume::update
/// DELETE /volumes/{id}                       -> volume::delete
///
/// GET    /chapters                           -> chapter::list
/// POST   /chapters                           -> chapter::create
/// POST   /chapters/setup-suggestions         -> chapter::setup_suggestions
/// GET    /chapters/{id}                      -> chapter::get_by_id
/// PUT    /chapters/{id}                      -> chapter::update
/// DELETE /chapters/{id}                      -> chapter::delete
/// PUT    /chapters/{id}/content              -> chapter::save_content
/// ```
pub fn router() -> Router<AppState> {
    let volume_routes = Router::new()
        .route("/", get(volume::list).post(volume::create))
        .route(
            "/{id}",
            get(volume::get_by_id)
                .put(volume::update)
                .delete(volume::delete),
        );

    let chapter_routes = Router::new()
        .route("/", get(chapter::list).post(chapter::create))
        .route("/setup-suggestions", post(chapter::setup_suggestions))
        .route(
            "/{id}",
            get(chapter::get_by_id)
                .put(chapter::update)
                .delete(chapter::delete),
        )
        .route("/{id}/content", put(chapter::save_content));

    Router::new()
        .nest("/volumes", volume_routes)
        .nest("/chapters", chapter_routes)
}
