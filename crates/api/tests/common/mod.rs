#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use futures::stream;
use http_body_util::BodyExt;
use tower::ServiceExt;

use lorekeeper_api::config::ServerConfig;
use lorekeeper_api::router::build_app_router;
use lorekeeper_api::state::AppState;
use lorekeeper_db::{create_memory_pool, run_migrations, DbPool};
use lorekeeper_events::EventBus;
use lorekeeper_llm::{CompletionRequest, LlmError, TextModel, TextStream};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: "sqlite::memory:".to_string(),
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        seed_path: None,
    }
}

/// Fresh in-memory database with every migration applied.
pub async fn test_pool() -> DbPool {
    let pool = create_memory_pool().await.unwrap();
    run_migrations(&pool).await.unwrap();
    pool
}

/// Build the full application router over `pool` with no text model.
///
/// Uses [`build_app_router`] so integration tests exercise the same
/// middleware stack (CORS, request ID, timeout, tracing, panic recovery)
/// that production uses.
pub fn build_test_app(pool: DbPool) -> Router {
    build_app(pool, None)
}

/// Same as [`build_test_app`] with `model` answering intake requests.
pub fn build_test_app_with_model(pool: DbPool, model: Arc<dyn TextModel>) -> Router {
    build_app(pool, Some(model))
}

fn build_app(pool: DbPool, text_model: Option<Arc<dyn TextModel>>) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::new(EventBus::default()),
        text_model,
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(app: Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn post_empty(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri, None).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// POST `body` and return the `data` of the created entity.
pub async fn create(pool: &DbPool, uri: &str, body: serde_json::Value) -> serde_json::Value {
    let response = post_json(build_test_app(pool.clone()), uri, body).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED, "POST {uri}");
    body_json(response).await["data"].clone()
}

/// POST `body` and return the id of the created entity.
pub async fn create_id(pool: &DbPool, uri: &str, body: serde_json::Value) -> i64 {
    create(pool, uri, body).await["id"].as_i64().unwrap()
}

// ---------------------------------------------------------------------------
// Scripted text model
// ---------------------------------------------------------------------------

/// A [`TextModel`] that replays fixed chunks, or fails when built with
/// [`ScriptedModel::failing`].
pub struct ScriptedModel {
    chunks: Vec<String>,
    fail: bool,
}

impl ScriptedModel {
    pub fn new(chunks: &[&str]) -> Arc<dyn TextModel> {
        Arc::new(Self {
            chunks: chunks.iter().map(|c| c.to_string()).collect(),
            fail: false,
        })
    }

    pub fn failing() -> Arc<dyn TextModel> {
        Arc::new(Self {
            chunks: Vec::new(),
            fail: true,
        })
    }
}

#[async_trait::async_trait]
impl TextModel for ScriptedModel {
    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, _request: CompletionRequest) -> Result<String, LlmError> {
        if self.fail {
            return Err(LlmError::Api {
                status: 529,
                body: "overloaded".into(),
            });
        }
        Ok(self.chunks.concat())
    }

    async fn stream(&self, _request: CompletionRequest) -> Result<TextStream, LlmError> {
        if self.fail {
            return Err(LlmError::Api {
                status: 529,
                body: "overloaded".into(),
            });
        }
        let items: Vec<Result<String, LlmError>> = self.chunks.iter().cloned().map(Ok).collect();
        Ok(Box::pin(stream::iter(items)))
    }
}

/// Parse a `text/event-stream` body into `(event, data)` pairs. Keep-alive
/// comments are ignored.
pub fn parse_sse(body: &str) -> Vec<(String, serde_json::Value)> {
    body.split("\n\n")
        .filter_map(|frame| {
            let mut event = None;
            let mut data = String::new();
            for line in frame.lines() {
                if let Some(name) = line.strip_prefix("event:") {
                    event = Some(name.trim().to_string());
                } else if let Some(value) = line.strip_prefix("data:") {
                    data.push_str(value.trim_start());
                }
            }
            let event = event?;
            Some((event, serde_json::from_str(&data).unwrap()))
        })
        .collect()
}
