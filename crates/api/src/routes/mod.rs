pub mod admin;
pub mod bible;
pub mod export;
pub mod health;
pub mod intake;
pub mod writing;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /health                                          service + database health
///
/// /characters                                      list (?q=&limit=&offset=), create
/// /characters/{id}                                 get, update, delete
/// /characters/{id}/relationships                   relationships of one character
/// /relationships                                   list, create
/// /relationships/{id}                              get, update, delete
/// /graph                                           relationship graph
/// /world                                           get, update (singleton)
/// /locations                                       list (?q=), create
/// /locations/{id}                                  get, update, delete
/// /factions                                        list (?q=), create
/// /factions/{id}                                   get, update, delete
/// /timeline                                        list, create
/// /timeline/{id}                                   get, update, delete
/// /arcs                                            list, create
/// /arcs/{id}                                       get, update, delete
/// /foreshadowing                                   list (?status=), create
/// /foreshadowing/{id}                              get, update, delete
/// /foreshadowing/{id}/hints                        add hint (POST)
/// /foreshadowing/{id}/resolve                      resolve (POST)
/// /foreshadowing/{id}/abandon                      abandon (POST)
/// /hooks                                           list (?chapter_id=), create
/// /hooks/{id}                                      get, update, delete
///
/// /volumes                                         list, create
/// /volumes/{id}                                    get, update, delete
/// /chapters                                        list (?volume_id=), create
/// /chapters/{id}                                   get, update, delete
/// /chapters/{id}/content                           save content (PUT)
/// /chapters/setup-suggestions                      chapter setup assist (POST)
///
/// /export/chapters                                 ?format=&volume_id=&ids=
/// /export/bible                                    ?format=markdown|json
///
/// /intake/decompose                                SSE decomposition (POST)
/// /intake/commit                                   commit drafts (POST)
///
/// /admin/schema                                    migration status
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        // Story bible: characters, world, places, factions, plot threads.
        .merge(bible::router())
        // Manuscript: volumes and chapters.
        .merge(writing::router())
        .nest("/export", export::router())
        .nest("/intake", intake::router())
        .nest("/admin", admin::router())
}
