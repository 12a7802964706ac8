//! Text-model access for AI-assisted intake.
//!
//! The rest of the workspace talks to [`TextModel`]; [`AnthropicClient`] is
//! the production implementation against the Anthropic Messages API.

pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod sse;

pub use client::AnthropicClient;
pub use config::LlmConfig;
pub use error::LlmError;
pub use model::{CompletionRequest, TextModel, TextStream};
