//! Text-model settings loaded from the environment.

pub const DEFAULT_API_BASE: &str = "https://api.anthropic.com/v1";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_MAX_TOKENS: u32 = 8192;
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Absent key disables AI features.
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl LlmConfig {
    /// Load from environment variables.
    ///
    /// | Env var              | Default                          |
    /// |----------------------|----------------------------------|
    /// | `ANTHROPIC_API_KEY`  | unset (AI features disabled)     |
    /// | `LLM_MODEL`          | `claude-sonnet-4-20250514`       |
    /// | `LLM_API_BASE`       | `https://api.anthropic.com/v1`   |
    /// | `LLM_MAX_TOKENS`     | `8192`                           |
    /// | `LLM_TIMEOUT_SECS`   | `300`                            |
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: std::env::var("ANTHROPIC_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            model: std::env::var("LLM_MODEL").unwrap_or(defaults.model),
            api_base: std::env::var("LLM_API_BASE")
                .map(|b| b.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base),
            max_tokens: std::env::var("LLM_MAX_TOKENS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_tokens),
            timeout_secs: std::env::var("LLM_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout_secs),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}
