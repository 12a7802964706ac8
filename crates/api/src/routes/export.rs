use axum::routing::get;
use axum::Router;

use crate::handlers::export;
use crate::state::AppState;

/// Routes mounted at `/export`.
///
/// ```text
/// GET /chapters     -> export_chapters
/// GET /bible        -> export_bible
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/chapters", get(export::export_chapters))
        .route("/bible", get(export::export_bible))
}
