use axum::routing::get;
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// GET /schema       -> schema
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/schema", get(admin::schema))
}
