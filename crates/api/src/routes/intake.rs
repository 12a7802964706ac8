use axum::routing::post;
use axum::Router;

use crate::handlers::intake;
use crate::state::AppState;

/// Routes mounted at `/intake`.
///
/// ```text
/// POST /decompose   -> decompose (text/event-stream)
/// POST /commit      -> commit
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/decompose", post(intake::decompose))
        .route("/commit", post(intake::commit))
}
