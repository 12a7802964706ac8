//! Route definitions for the story bible.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{
    arc, character, faction, foreshadowing, hook, location, relationship, timeline, world,
};
use crate::state::AppState;

/// Routes mounted at the `/api/v1` root.
///
/// ```text
/// GET    /characters                         -> character::list
/// POST   /characters                         -> character::create
/// GET    /characters/{id}                    -> character::get_by_id
/// PUT    /characters/{id}                    -> character::update
/// DELETE /characters/{id}                    -> character::delete
/// GET    /characters/{id}/relationships      -> character::list_relationships
///
/// GET    /relationships                      -> relationship::list
/// POST   /relationships                      -> relationship::create
/// GET    /relationships/{id}                 -> relationship::get_by_id
/// PUT    /relationships/{id}                 -> relationship::update
/// DELETE /relationships/{id}                 -> relationship::delete
/// GET    /graph                              -> relationship::graph
///
/// GET    /world                              -> world::get
/// PUT    /world                              -> world::update
///
/// POST   /foreshadowing/{id}/hints           -> foreshadowing::add_hint
/// POST   /foreshadowing/{id}/resolve         -> foreshadowing::resolve
/// POST   /foreshadowing/{id}/abandon         -> foreshadowing::abandon
/// ```
///
/// Locations, factions, timeline, arcs, foreshadowing and hooks follow the
/// same list/create and get/update/delete shape as characters.
pub fn router() -> Router<AppState> {
    let character_routes = Router::new()
        .route("/", get(character::list).post(character::create))
        .route(
            "/{id}",
            get(character::get_by_id)
                .put(character::update)
                .delete(character::delete),
        )
        .route("/{id}/relationships", get(character::list_relationships));

    let relationship_routes = Router::new()
        .route("/", get(relationship::list).post(relationship::create))
        .route(
            "/{id}",
            get(relationship::get_by_id)
                .put(relationship::update)
                .delete(relationship::delete),
        );

    let location_routes = Router::new()
        .route("/", get(location::list).post(location::create))
        .route(
            "/{id}",
            get(location::get_by_id)
                .put(location::update)
                .delete(location::delete),
        );

    let faction_routes = Router::new()
        .route("/", get(faction::list).post(faction::create))
        .route(
            "/{id}",
            get(faction::get_by_id)
                .put(faction::update)
                .delete(faction::delete),
        );

    let timeline_routes = Router::new()
        .route("/", get(timeline::list).post(timeline::create))
        .route(
            "/{id}",
            get(timeline::get_by_id)
                .put(timeline::update)
                .delete(timeline::delete),
        );

    let arc_routes = Router::new()
        .route("/", get(arc::list).post(arc::create))
        .route(
            "/{id}",
            get(arc::get_by_id).put(arc::update).delete(arc::delete),
        );

    let foreshadowing_routes = Router::new()
        .route("/", get(foreshadowing::list).post(foreshadowing::create))
        .route(
            "/{id}",
            get(foreshadowing::get_by_id)
                .put(foreshadowing::update)
                .delete(foreshadowing::delete),
        )
        .route("/{id}/hints", post(foreshadowing::add_hint))
        .route("/{id}/resolve", post(foreshadowing::resolve))
        .route("/{id}/abandon", post(foreshadowing::abandon));

    let hook_routes = Router::new()
        .route("/", get(hook::list).post(hook::create))
        .route(
            "/{id}",
            get(hook::get_by_id).put(hook::update).delete(hook::delete),
        );

    Router::new()
        .nest("/characters", character_routes)
        .nest("/relationships", relationship_routes)
        .route("/graph", get(relationship::graph))
        .route("/world", get(world::get).put(world::update))
        .nest("/locations", location_routes)
        .nest("/factions", faction_routes)
        .nest("/timeline", timeline_routes)
        .nest("/arcs", arc_routes)
        .nest("/foreshadowing", foreshadowing_routes)
        .nest("/hooks", hook_routes)
}
