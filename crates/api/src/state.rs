use std::sync::Arc;

use lorekeeper_events::EventBus;
use lorekeeper_llm::TextModel;

use crate::config::ServerConfig;

/// Shared application state available to all handlers via `State<AppState>`.
///
/// Cheap to clone: the pool is reference-counted and everything else sits
/// behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub pool: lorekeeper_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Publishes a domain event after every successful mutation.
    pub event_bus: Arc<EventBus>,
    /// `None` when no API key is configured; intake then answers 503.
    pub text_model: Option<Arc<dyn TextModel>>,
}
