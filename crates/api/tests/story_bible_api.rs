//! HTTP-level integration tests for the story-bible endpoints.
//!
//! Uses Axum's tower::ServiceExt to send requests directly to the router
//! without an actual TCP listener.

mod common;

use axum::http::StatusCode;
use common::{body_json, create, create_id, delete, get, post_empty, post_json, put_json};
use serde_json::json;

// ---------------------------------------------------------------------------
// Characters
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_character_returns_201_with_envelope() {
    let pool = common::test_pool().await;
    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/characters",
        json!({
            "name": "Lin Feng",
            "role": "main",
            "motivation": {"surface": "revenge", "core": "belonging"},
            "voice_samples": ["I do not bow."]
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["name"], "Lin Feng");
    assert_eq!(json["data"]["role"], "main");
    assert_eq!(json["data"]["motivation"]["core"], "belonging");
    assert_eq!(json["data"]["voice_samples"][0], "I do not bow.");
    assert!(json["data"]["id"].is_number());
}

#[tokio::test]
async fn blank_character_name_is_rejected() {
    let pool = common::test_pool().await;
    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/characters",
        json!({"name": "   "}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn character_get_update_delete() {
    let pool = common::test_pool().await;
    let id = create_id(&pool, "/api/v1/characters", json!({"name": "Su Yan"})).await;

    let response = put_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/characters/{id}"),
        json!({"role": "supporting", "appearance": "Silver hairpin"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "Su Yan");
    assert_eq!(json["data"]["role"], "supporting");

    let response = delete(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/characters/{id}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(
        common::build_test_app(pool),
        &format!("/api/v1/characters/{id}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_missing_character_returns_404() {
    let pool = common::test_pool().await;
    let response = put_json(
        common::build_test_app(pool),
        "/api/v1/characters/404",
        json!({"appearance": "tall"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn character_search_matches_substring() {
    let pool = common::test_pool().await;
    for name in ["Lin Feng", "Lin Xue", "Zhao Ming"] {
        create(&pool, "/api/v1/characters", json!({"name": name})).await;
    }

    let response = get(common::build_test_app(pool.clone()), "/api/v1/characters?q=lin").await;
    let json = body_json(response).await;
    let names: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.iter().all(|n| n.starts_with("Lin")));

    let response = get(common::build_test_app(pool), "/api/v1/characters").await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 3);
}

// ---------------------------------------------------------------------------
// Relationships and graph
// ---------------------------------------------------------------------------

#[tokio::test]
async fn relationship_lifecycle_and_graph() {
    let pool = common::test_pool().await;
    let a = create_id(&pool, "/api/v1/characters", json!({"name": "Lin Feng"})).await;
    let b = create_id(&pool, "/api/v1/characters", json!({"name": "Su Yan"})).await;

    let rel = create(
        &pool,
        "/api/v1/relationships",
        json!({"source_id": a, "target_id": b, "rel_type": "companion", "evolution": "wary to loyal"}),
    )
    .await;
    assert_eq!(rel["rel_type"], "companion");

    let response = get(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/characters/{b}/relationships"),
    )
    .await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 1);

    let response = get(common::build_test_app(pool.clone()), "/api/v1/graph").await;
    let graph = body_json(response).await["data"].clone();
    assert_eq!(graph["nodes"].as_array().unwrap().len(), 2);
    let edges = graph["edges"].as_array().unwrap();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0]["source"], a);
    assert_eq!(edges[0]["target"], b);

    // Deleting an endpoint removes the relationship.
    delete(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/characters/{a}"),
    )
    .await;
    let response = get(common::build_test_app(pool), "/api/v1/relationships").await;
    assert!(body_json(response).await["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn self_relationship_is_rejected() {
    let pool = common::test_pool().await;
    let a = create_id(&pool, "/api/v1/characters", json!({"name": "Lin Feng"})).await;

    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/relationships",
        json!({"source_id": a, "target_id": a, "rel_type": "rival"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn relationship_to_unknown_character_is_a_validation_error() {
    let pool = common::test_pool().await;
    let a = create_id(&pool, "/api/v1/characters", json!({"name": "Lin Feng"})).await;

    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/relationships",
        json!({"source_id": a, "target_id": 999, "rel_type": "enemy"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"]["message"].as_str().unwrap().contains("target_id"));
}

#[tokio::test]
async fn relationships_of_missing_character_returns_404() {
    let pool = common::test_pool().await;
    let response = get(
        common::build_test_app(pool),
        "/api/v1/characters/77/relationships",
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

#[tokio::test]
async fn world_defaults_then_saves() {
    let pool = common::test_pool().await;

    let response = get(common::build_test_app(pool.clone()), "/api/v1/world").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["data"]["power_system"].is_null());
    assert!(json["data"]["updated_at"].is_null());

    let response = put_json(
        common::build_test_app(pool.clone()),
        "/api/v1/world",
        json!({
            "power_system": {"name": "Qi", "levels": ["Foundation", "Core"]},
            "social_rules": {"inheritance": "eldest son"}
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // A partial update keeps the other section.
    put_json(
        common::build_test_app(pool.clone()),
        "/api/v1/world",
        json!({"social_rules": {"marriage": "arranged"}}),
    )
    .await;

    let json = body_json(get(common::build_test_app(pool), "/api/v1/world").await).await;
    assert_eq!(json["data"]["power_system"]["levels"][1], "Core");
    assert_eq!(json["data"]["social_rules"]["marriage"], "arranged");
    assert!(json["data"]["updated_at"].is_string());
}

// ---------------------------------------------------------------------------
// Locations and factions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn location_cannot_connect_to_itself() {
    let pool = common::test_pool().await;
    let id = create_id(&pool, "/api/v1/locations", json!({"name": "Azure Peak"})).await;

    let response = put_json(
        common::build_test_app(pool),
        &format!("/api/v1/locations/{id}"),
        json!({"connections": [id]}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn location_connections_must_exist() {
    let pool = common::test_pool().await;
    let peak = create_id(&pool, "/api/v1/locations", json!({"name": "Azure Peak"})).await;

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/locations",
        json!({"name": "Mist Valley", "connections": [peak, 500]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let valley = create(
        &pool,
        "/api/v1/locations",
        json!({"name": "Mist Valley", "connections": [peak]}),
    )
    .await;
    assert_eq!(valley["connections"], json!([peak]));
}

#[tokio::test]
async fn faction_leader_is_checked_and_cleared_on_delete() {
    let pool = common::test_pool().await;

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/factions",
        json!({"name": "Blood Sect", "leader_id": 12}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let leader = create_id(&pool, "/api/v1/characters", json!({"name": "Elder Mo"})).await;
    let faction = create_id(
        &pool,
        "/api/v1/factions",
        json!({"name": "Blood Sect", "leader_id": leader, "stance_to_mc": "hostile", "goals": ["Open the gate"]}),
    )
    .await;

    delete(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/characters/{leader}"),
    )
    .await;

    let json = body_json(
        get(
            common::build_test_app(pool),
            &format!("/api/v1/factions/{faction}"),
        )
        .await,
    )
    .await;
    assert!(json["data"]["leader_id"].is_null());
    assert_eq!(json["data"]["goals"][0], "Open the gate");
}

#[tokio::test]
async fn faction_search_by_name() {
    let pool = common::test_pool().await;
    create(&pool, "/api/v1/factions", json!({"name": "Blood Sect"})).await;
    create(&pool, "/api/v1/factions", json!({"name": "Azure Cloud Sect"})).await;
    create(&pool, "/api/v1/factions", json!({"name": "Merchant Guild"})).await;

    let json = body_json(get(common::build_test_app(pool), "/api/v1/factions?q=sect").await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Timeline and arcs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn timeline_event_requires_description_and_known_characters() {
    let pool = common::test_pool().await;

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/timeline",
        json!({"description": "", "event_date": "Year 3"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/timeline",
        json!({"description": "The sect falls", "related_characters": [3]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let event = create(
        &pool,
        "/api/v1/timeline",
        json!({"description": "The sect falls", "event_date": "Year 3"}),
    )
    .await;
    assert_eq!(event["event_date"], "Year 3");
}

#[tokio::test]
async fn arc_validates_range_and_progress() {
    let pool = common::test_pool().await;

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/arcs",
        json!({"name": "Trial", "chapter_start": 10, "chapter_end": 2}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/arcs",
        json!({"name": "Trial", "progress": 140}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let arc = create(
        &pool,
        "/api/v1/arcs",
        json!({"name": "Trial", "arc_type": "main", "chapter_start": 5, "chapter_end": 9}),
    )
    .await;
    assert_eq!(arc["status"], "planned");
    let id = arc["id"].as_i64().unwrap();

    // Only one bound given: checked against the stored end (9).
    let response = put_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/arcs/{id}"),
        json!({"chapter_start": 12}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = put_json(
        common::build_test_app(pool),
        &format!("/api/v1/arcs/{id}"),
        json!({"status": "in_progress", "progress": 40}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "in_progress");
    assert_eq!(json["data"]["progress"], 40);
}

// ---------------------------------------------------------------------------
// Foreshadowing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn foreshadowing_lifecycle() {
    let pool = common::test_pool().await;
    let chapter = create_id(&pool, "/api/v1/chapters", json!({"title": "The Gate"})).await;
    let later = create_id(&pool, "/api/v1/chapters", json!({"title": "The Return"})).await;

    let thread = create(
        &pool,
        "/api/v1/foreshadowing",
        json!({"content": "The jade pendant glows", "term": "long", "planted_chapter": chapter}),
    )
    .await;
    assert_eq!(thread["status"], "active");
    let id = thread["id"].as_i64().unwrap();

    let response = post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/foreshadowing/{id}/hints"),
        json!({"chapter": later, "text": "It warms near the tomb"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["hints"][0]["text"], "It warms near the tomb");

    let response = post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/foreshadowing/{id}/resolve"),
        json!({"chapter": later}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "resolved");
    assert_eq!(json["data"]["resolved_chapter"], later);

    // Resolved threads are terminal.
    let response = post_empty(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/foreshadowing/{id}/abandon"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/foreshadowing/{id}/hints"),
        json!({"chapter": later, "text": "too late"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let json = body_json(
        get(
            common::build_test_app(pool.clone()),
            "/api/v1/foreshadowing?status=resolved",
        )
        .await,
    )
    .await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let json = body_json(
        get(
            common::build_test_app(pool),
            "/api/v1/foreshadowing?status=active",
        )
        .await,
    )
    .await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn abandoned_foreshadowing_cannot_be_resolved() {
    let pool = common::test_pool().await;
    let chapter = create_id(&pool, "/api/v1/chapters", json!({"title": "The Oath"})).await;
    let id = create_id(
        &pool,
        "/api/v1/foreshadowing",
        json!({"content": "A broken oath"}),
    )
    .await;

    let response = post_empty(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/foreshadowing/{id}/abandon"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/foreshadowing/{id}/resolve"),
        json!({"chapter": chapter}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert!(json["error"]["message"]
        .as_str()
        .unwrap()
        .contains("already abandoned"));

    let json = body_json(
        get(
            common::build_test_app(pool),
            &format!("/api/v1/foreshadowing/{id}"),
        )
        .await,
    )
    .await;
    assert_eq!(json["data"]["status"], "abandoned");
    assert!(json["data"]["resolved_chapter"].is_null());
}

#[tokio::test]
async fn resolving_in_unknown_chapter_is_rejected() {
    let pool = common::test_pool().await;
    let id = create_id(
        &pool,
        "/api/v1/foreshadowing",
        json!({"content": "A sealed letter"}),
    )
    .await;

    let response = post_json(
        common::build_test_app(pool),
        &format!("/api/v1/foreshadowing/{id}/resolve"),
        json!({"chapter": 321}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn foreshadowing_status_filter_must_be_known() {
    let pool = common::test_pool().await;
    let response = get(
        common::build_test_app(pool),
        "/api/v1/foreshadowing?status=forgotten",
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Hooks
// ---------------------------------------------------------------------------

#[tokio::test]
async fn hooks_filter_by_chapter() {
    let pool = common::test_pool().await;
    let chapter = create_id(&pool, "/api/v1/chapters", json!({"title": "One"})).await;

    create(
        &pool,
        "/api/v1/hooks",
        json!({"hook_type": "chapter", "content": "A knock at midnight", "chapter_id": chapter, "style": "suspense", "strength": 80}),
    )
    .await;
    create(
        &pool,
        "/api/v1/hooks",
        json!({"hook_type": "opening", "content": "The world ends on page one"}),
    )
    .await;

    let json = body_json(
        get(
            common::build_test_app(pool.clone()),
            &format!("/api/v1/hooks?chapter_id={chapter}"),
        )
        .await,
    )
    .await;
    let hooks = json["data"].as_array().unwrap();
    assert_eq!(hooks.len(), 1);
    assert_eq!(hooks[0]["strength"], 80);

    let json = body_json(get(common::build_test_app(pool), "/api/v1/hooks").await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn hook_strength_out_of_range_is_rejected() {
    let pool = common::test_pool().await;
    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/hooks",
        json!({"hook_type": "arc", "content": "Betrayal", "strength": 101}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
