//! Anthropic Messages API client.

use std::time::Duration;

use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::error::LlmError;
use crate::model::{CompletionRequest, TextModel, TextStream};
use crate::sse::{parse_sse_buffered, SseEvent};

const API_VERSION: &str = "2023-06-01";

pub struct AnthropicClient {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: [ApiMessage<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    content: Vec<ApiContent>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ApiContent {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

impl AnthropicClient {
    /// Build a client from configuration. Fails without an API key.
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| LlmError::Config("ANTHROPIC_API_KEY is not set".to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| LlmError::Config(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            api_base: config.api_base.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    fn headers(&self) -> Result<HeaderMap, LlmError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("anthropic-version", HeaderValue::from_static(API_VERSION));
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|_| LlmError::Config("API key contains invalid characters".to_string()))?,
        );
        Ok(headers)
    }

    fn body<'a>(&'a self, request: &'a CompletionRequest, stream: bool) -> ApiRequest<'a> {
        ApiRequest {
            model: &self.model,
            max_tokens: request.max_tokens.unwrap_or(self.max_tokens),
            system: request.system.as_deref(),
            messages: [ApiMessage {
                role: "user",
                content: &request.prompt,
            }],
            temperature: request.temperature,
            stream,
        }
    }

    async fn send(
        &self,
        request: &CompletionRequest,
        stream: bool,
    ) -> Result<reqwest::Response, LlmError> {
        let response = self
            .client
            .post(format!("{}/messages", self.api_base))
            .headers(self.headers()?)
            .json(&self.body(request, stream))
            .send()
            .await?;

        Self::ensure_success(response).await
    }

    /// Map a non-2xx response to [`LlmError::Api`] carrying the body text.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, LlmError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {e}>"));
            tracing::warn!(status = status.as_u16(), "Text model request failed");
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

fn collect_text(response: ApiResponse) -> String {
    response
        .content
        .into_iter()
        .filter_map(|block| match block {
            ApiContent::Text { text } => Some(text),
            ApiContent::Other => None,
        })
        .collect()
}

#[async_trait::async_trait]
impl TextModel for AnthropicClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError> {
        let response = self.send(&request, false).await?;
        let parsed: ApiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;
        Ok(collect_text(parsed))
    }

    async fn stream(&self, request: CompletionRequest) -> Result<TextStream, LlmError> {
        let response = self.send(&request, true).await?;
        Ok(text_deltas(response.bytes_stream()))
    }
}

/// Turn a raw SSE body into text deltas. Bytes are buffered until a line is
/// complete, so characters split across chunks decode intact.
fn text_deltas<S, B, E>(body: S) -> TextStream
where
    S: futures::Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + 'static,
    E: std::fmt::Display + 'static,
{
    let stream = body
        .scan(Vec::new(), |buffer, chunk| {
            let events = match chunk {
                Ok(bytes) => {
                    buffer.extend_from_slice(bytes.as_ref());
                    parse_sse_buffered(buffer)
                }
                Err(e) => vec![Err(LlmError::Request(e.to_string()))],
            };
            futures::future::ready(Some(events))
        })
        .flat_map(futures::stream::iter)
        .filter_map(|event| {
            futures::future::ready(match event {
                Ok(SseEvent::TextDelta(text)) => Some(Ok(text)),
                Ok(SseEvent::MessageStop) => None,
                Ok(SseEvent::Error(message)) => Some(Err(LlmError::Stream(message))),
                Err(e) => Some(Err(e)),
            })
        });

    Box::pin(stream)
}
