//! HTTP-level integration tests for chapter and story-bible export.

mod common;

use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use common::{body_bytes, body_json, body_text, create, create_id, get};
use serde_json::json;

fn header(response: &axum::http::Response<axum::body::Body>, name: axum::http::HeaderName) -> String {
    response
        .headers()
        .get(name)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

async fn seed_chapters(pool: &lorekeeper_db::DbPool) -> i64 {
    let volume = create_id(pool, "/api/v1/volumes", json!({"name": "Book One: Exile"})).await;
    create(
        pool,
        "/api/v1/chapters",
        json!({"title": "The Gate", "sort_order": 2, "volume_id": volume, "content": "Snow fell.\n\nThe gate opened."}),
    )
    .await;
    create(
        pool,
        "/api/v1/chapters",
        json!({"title": "Dawn", "sort_order": 1, "volume_id": volume, "content": "Lin Feng woke."}),
    )
    .await;
    create(
        pool,
        "/api/v1/chapters",
        json!({"title": "Interlude", "sort_order": 3, "content": "Elsewhere."}),
    )
    .await;
    volume
}

#[tokio::test]
async fn chapters_export_as_markdown_attachment() {
    let pool = common::test_pool().await;
    seed_chapters(&pool).await;

    let response = get(common::build_test_app(pool), "/api/v1/export/chapters").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, CONTENT_TYPE), "text/markdown; charset=utf-8");
    assert_eq!(
        header(&response, CONTENT_DISPOSITION),
        "attachment; filename=\"chapters.md\""
    );

    let body = body_text(response).await;
    let dawn = body.find("# Dawn").unwrap();
    let gate = body.find("# The Gate").unwrap();
    let interlude = body.find("# Interlude").unwrap();
    assert!(dawn < gate && gate < interlude);
    assert!(body.contains("Snow fell.\n\nThe gate opened."));
}

#[tokio::test]
async fn volume_export_is_named_after_the_volume() {
    let pool = common::test_pool().await;
    let volume = seed_chapters(&pool).await;

    let response = get(
        common::build_test_app(pool),
        &format!("/api/v1/export/chapters?format=txt&volume_id={volume}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header(&response, CONTENT_DISPOSITION),
        "attachment; filename=\"book-one-exile.txt\""
    );

    let body = body_text(response).await;
    assert!(body.contains("Dawn"));
    assert!(!body.contains("Interlude"));
}

#[tokio::test]
async fn explicit_ids_take_priority_over_volume() {
    let pool = common::test_pool().await;
    let volume = seed_chapters(&pool).await;

    let response = get(
        common::build_test_app(pool),
        &format!("/api/v1/export/chapters?volume_id={volume}&ids=3"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("# Interlude"));
    assert!(!body.contains("# Dawn"));
}

#[tokio::test]
async fn docx_export_is_a_zip_archive() {
    let pool = common::test_pool().await;
    seed_chapters(&pool).await;

    let response = get(
        common::build_test_app(pool),
        "/api/v1/export/chapters?format=docx",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header(&response, CONTENT_DISPOSITION),
        "attachment; filename=\"chapters.docx\""
    );

    let bytes = body_bytes(response).await;
    assert!(bytes.starts_with(b"PK"));
}

#[tokio::test]
async fn bad_chapter_selections_are_rejected() {
    let pool = common::test_pool().await;

    // Nothing to export yet.
    let response = get(common::build_test_app(pool.clone()), "/api/v1/export/chapters").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");

    seed_chapters(&pool).await;

    let response = get(
        common::build_test_app(pool.clone()),
        "/api/v1/export/chapters?ids=1,x",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "BAD_REQUEST");

    let response = get(
        common::build_test_app(pool.clone()),
        "/api/v1/export/chapters?ids=1,99",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"]["message"].as_str().unwrap().contains("99"));

    let response = get(
        common::build_test_app(pool.clone()),
        "/api/v1/export/chapters?format=json",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(
        common::build_test_app(pool.clone()),
        "/api/v1/export/chapters?format=pdf",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(
        common::build_test_app(pool),
        "/api/v1/export/chapters?volume_id=77",
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn bible_exports_as_json_snapshot() {
    let pool = common::test_pool().await;
    let lin = create_id(
        &pool,
        "/api/v1/characters",
        json!({"name": "Lin Feng", "role": "main"}),
    )
    .await;
    let su = create_id(&pool, "/api/v1/characters", json!({"name": "Su Yan"})).await;
    create(
        &pool,
        "/api/v1/relationships",
        json!({"source_id": lin, "target_id": su, "rel_type": "companion"}),
    )
    .await;
    create(
        &pool,
        "/api/v1/factions",
        json!({"name": "Azure Sect", "leader_id": su}),
    )
    .await;

    let response = get(
        common::build_test_app(pool),
        "/api/v1/export/bible?format=json",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, CONTENT_TYPE), "application/json");
    assert_eq!(
        header(&response, CONTENT_DISPOSITION),
        "attachment; filename=\"story-bible.json\""
    );

    let snapshot = body_json(response).await;
    assert_eq!(snapshot["characters"][0]["name"], "Lin Feng");
    assert_eq!(snapshot["relationships"][0]["source"], "Lin Feng");
    assert_eq!(snapshot["relationships"][0]["target"], "Su Yan");
    assert_eq!(snapshot["factions"][0]["leader"], "Su Yan");
}

#[tokio::test]
async fn bible_markdown_is_the_default() {
    let pool = common::test_pool().await;
    create(&pool, "/api/v1/characters", json!({"name": "Lin Feng"})).await;

    let response = get(common::build_test_app(pool.clone()), "/api/v1/export/bible").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header(&response, CONTENT_DISPOSITION),
        "attachment; filename=\"story-bible.md\""
    );
    let body = body_text(response).await;
    assert!(body.starts_with("# Story Bible"));
    assert!(body.contains("Lin Feng"));

    let response = get(
        common::build_test_app(pool),
        "/api/v1/export/bible?format=docx",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
