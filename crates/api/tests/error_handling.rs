//! Tests for `AppError` -> HTTP response mapping.
//!
//! Most tests call `IntoResponse` directly on `AppError` values; the last
//! few go through the router to check the envelope end to end.

mod common;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::{body_json, get, post_json};
use http_body_util::BodyExt;
use lorekeeper_api::error::AppError;
use lorekeeper_core::error::CoreError;
use lorekeeper_db::MigrationError;
use lorekeeper_llm::LlmError;

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "Character",
        id: 42,
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "NOT_FOUND");
    assert_eq!(json["error"]["message"], "Character with id 42 not found");
}

#[tokio::test]
async fn validation_error_returns_400() {
    let (status, json) = error_to_response(AppError::validation("name: must not be empty")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"]["message"], "name: must not be empty");
}

#[tokio::test]
async fn bad_request_error_returns_400() {
    let err = AppError::BadRequest("Invalid id 'x' in ids".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn conflict_error_returns_409() {
    let (status, json) = error_to_response(AppError::conflict("thread is resolved")).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"]["code"], "CONFLICT");
    assert_eq!(json["error"]["message"], "thread is resolved");
}

#[tokio::test]
async fn internal_error_returns_500_and_sanitizes_message() {
    let err = AppError::InternalError("secret path /var/lib/lorekeeper leaked".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"]["code"], "INTERNAL_ERROR");
    let message = json["error"]["message"].as_str().unwrap();
    assert!(!message.contains("secret"));
}

#[tokio::test]
async fn row_not_found_returns_404() {
    let (status, json) = error_to_response(AppError::Database(sqlx::Error::RowNotFound)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn other_database_errors_are_sanitized() {
    let err = AppError::Database(sqlx::Error::Protocol("connection reset".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!json["error"]["message"]
        .as_str()
        .unwrap()
        .contains("connection reset"));
}

#[tokio::test]
async fn llm_errors_return_503() {
    let (status, json) = error_to_response(AppError::Llm(LlmError::Config(
        "ANTHROPIC_API_KEY is not set".into(),
    )))
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error"]["code"], "AI_UNAVAILABLE");

    let (status, _) = error_to_response(AppError::Llm(LlmError::Api {
        status: 529,
        body: "overloaded".into(),
    }))
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn unavailable_core_error_returns_503() {
    let err = AppError::Core(CoreError::Unavailable("No text model".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error"]["code"], "AI_UNAVAILABLE");
}

#[tokio::test]
async fn migration_rule_errors_return_409() {
    let err = AppError::Migration(MigrationError::NothingToRollback);

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"]["code"], "CONFLICT");
}

// ---------------------------------------------------------------------------
// Through the router
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_entity_uses_error_envelope() {
    let app = common::build_test_app(common::test_pool().await);
    let response = get(app, "/api/v1/characters/999").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "NOT_FOUND");
    assert_eq!(json["error"]["message"], "Character with id 999 not found");
}

#[tokio::test]
async fn invalid_enum_value_is_a_validation_error() {
    let app = common::build_test_app(common::test_pool().await);
    let response = post_json(
        app,
        "/api/v1/characters",
        serde_json::json!({"name": "Lin Feng", "role": "hero"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    assert!(json["error"]["message"].as_str().unwrap().contains("role"));
}
