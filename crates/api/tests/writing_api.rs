//! HTTP-level integration tests for volumes, chapters and the chapter setup
//! assist.

mod common;

use axum::http::StatusCode;
use common::{body_json, create, create_id, delete, get, post_json, put_json};
use serde_json::json;

// ---------------------------------------------------------------------------
// Volumes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn volume_crud() {
    let pool = common::test_pool().await;
    let volume = create(
        &pool,
        "/api/v1/volumes",
        json!({"name": "Book One", "theme": "Exile", "chapter_start": 1, "chapter_end": 30}),
    )
    .await;
    let id = volume["id"].as_i64().unwrap();
    assert_eq!(volume["theme"], "Exile");

    let response = put_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/volumes/{id}"),
        json!({"mc_growth": "Learns to trust"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["data"]["mc_growth"],
        "Learns to trust"
    );

    let json = body_json(get(common::build_test_app(pool.clone()), "/api/v1/volumes").await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let response = delete(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/volumes/{id}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = delete(
        common::build_test_app(pool),
        &format!("/api/v1/volumes/{id}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn volume_range_is_checked_against_stored_bound() {
    let pool = common::test_pool().await;
    let id = create_id(
        &pool,
        "/api/v1/volumes",
        json!({"name": "Book One", "chapter_start": 10}),
    )
    .await;

    let response = put_json(
        common::build_test_app(pool),
        &format!("/api/v1/volumes/{id}"),
        json!({"chapter_end": 4}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleting_volume_detaches_its_chapters() {
    let pool = common::test_pool().await;
    let volume = create_id(&pool, "/api/v1/volumes", json!({"name": "Book One"})).await;
    let chapter = create_id(
        &pool,
        "/api/v1/chapters",
        json!({"title": "Exile", "volume_id": volume}),
    )
    .await;

    delete(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/volumes/{volume}"),
    )
    .await;

    let json = body_json(
        get(
            common::build_test_app(pool),
            &format!("/api/v1/chapters/{chapter}"),
        )
        .await,
    )
    .await;
    assert!(json["data"]["volume_id"].is_null());
    assert_eq!(json["data"]["title"], "Exile");
}

// ---------------------------------------------------------------------------
// Chapters
// ---------------------------------------------------------------------------

#[tokio::test]
async fn chapter_word_count_follows_content() {
    let pool = common::test_pool().await;
    let chapter = create(
        &pool,
        "/api/v1/chapters",
        json!({"title": "Dawn", "content": "The well-known road didn't end."}),
    )
    .await;
    assert_eq!(chapter["word_count"], 5);
    assert_eq!(chapter["status"], "outline");
    let id = chapter["id"].as_i64().unwrap();

    let response = put_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/chapters/{id}/content"),
        json!({"content": "林风拔剑 and ran"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["word_count"], 6);
    assert_eq!(json["data"]["title"], "Dawn");

    // Metadata updates leave the body alone.
    let response = put_json(
        common::build_test_app(pool),
        &format!("/api/v1/chapters/{id}"),
        json!({"status": "draft", "tension": "high"}),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "draft");
    assert_eq!(json["data"]["content"], "林风拔剑 and ran");
}

#[tokio::test]
async fn saving_content_of_missing_chapter_returns_404() {
    let pool = common::test_pool().await;
    let response = put_json(
        common::build_test_app(pool),
        "/api/v1/chapters/55/content",
        json!({"content": "lost"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn chapter_list_is_ordered_and_omits_content() {
    let pool = common::test_pool().await;
    let volume = create_id(&pool, "/api/v1/volumes", json!({"name": "Book One"})).await;
    create(
        &pool,
        "/api/v1/chapters",
        json!({"title": "Second", "sort_order": 2, "volume_id": volume, "content": "b"}),
    )
    .await;
    create(
        &pool,
        "/api/v1/chapters",
        json!({"title": "First", "sort_order": 1, "volume_id": volume, "content": "a"}),
    )
    .await;
    create(&pool, "/api/v1/chapters", json!({"title": "Loose"})).await;

    let json = body_json(
        get(
            common::build_test_app(pool.clone()),
            &format!("/api/v1/chapters?volume_id={volume}"),
        )
        .await,
    )
    .await;
    let chapters = json["data"].as_array().unwrap();
    assert_eq!(chapters.len(), 2);
    assert_eq!(chapters[0]["title"], "First");
    assert_eq!(chapters[1]["title"], "Second");
    assert!(chapters[0].get("content").is_none());

    let json = body_json(get(common::build_test_app(pool), "/api/v1/chapters").await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn chapter_references_must_exist() {
    let pool = common::test_pool().await;

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/chapters",
        json!({"title": "Ghost", "volume_id": 9}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/chapters",
        json!({"title": "Ghost", "characters": [1, 2]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"]["message"].as_str().unwrap().contains("1, 2"));

    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/chapters",
        json!({"title": "Ghost", "tension": "extreme"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn chapter_with_non_numeric_id_is_rejected() {
    let pool = common::test_pool().await;
    let response = get(common::build_test_app(pool), "/api/v1/chapters/abc").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Chapter setup assist
// ---------------------------------------------------------------------------

#[tokio::test]
async fn setup_suggestions_rank_sources() {
    let pool = common::test_pool().await;
    let lin = create_id(&pool, "/api/v1/characters", json!({"name": "Lin Feng"})).await;
    let su = create_id(&pool, "/api/v1/characters", json!({"name": "Su Yan"})).await;
    let mo = create_id(&pool, "/api/v1/characters", json!({"name": "Elder Mo"})).await;
    let peak = create_id(&pool, "/api/v1/locations", json!({"name": "Azure Peak"})).await;
    let arc = create_id(
        &pool,
        "/api/v1/arcs",
        json!({"name": "Trial", "main_characters": [mo]}),
    )
    .await;

    create(
        &pool,
        "/api/v1/chapters",
        json!({"title": "One", "sort_order": 1, "characters": [su], "locations": [peak]}),
    )
    .await;
    let current = create_id(
        &pool,
        "/api/v1/chapters",
        json!({
            "title": "Two",
            "sort_order": 2,
            "arc_id": arc,
            "outline": {"goal": "Lin Feng climbs alone", "scenes": []}
        }),
    )
    .await;

    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/chapters/setup-suggestions",
        json!({"chapter_id": current}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    let characters = json["data"]["characters"].as_array().unwrap();
    assert_eq!(characters.len(), 3);
    assert_eq!(characters[0]["id"], lin);
    assert_eq!(characters[0]["source"], "outline");
    assert_eq!(characters[0]["confidence"], 0.9);
    assert_eq!(characters[1]["id"], su);
    assert_eq!(characters[1]["source"], "previous_chapter");
    assert_eq!(characters[2]["id"], mo);
    assert_eq!(characters[2]["source"], "arc_roster");

    let locations = json["data"]["locations"].as_array().unwrap();
    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0]["label"], "Azure Peak");
}

#[tokio::test]
async fn setup_suggestions_skip_inactive_foreshadowing() {
    let pool = common::test_pool().await;
    create(
        &pool,
        "/api/v1/foreshadowing",
        json!({"content": "jade pendant"}),
    )
    .await;
    let abandoned = create_id(
        &pool,
        "/api/v1/foreshadowing",
        json!({"content": "jade pendant twin"}),
    )
    .await;
    common::post_empty(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/foreshadowing/{abandoned}/abandon"),
    )
    .await;

    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/chapters/setup-suggestions",
        json!({"outline": "The jade pendant twin glows while the jade pendant cracks"}),
    )
    .await;
    let json = body_json(response).await;
    let threads = json["data"]["foreshadowing"].as_array().unwrap();
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0]["label"], "jade pendant");
}

#[tokio::test]
async fn setup_suggestions_for_missing_chapter_returns_404() {
    let pool = common::test_pool().await;
    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/chapters/setup-suggestions",
        json!({"chapter_id": 404}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
