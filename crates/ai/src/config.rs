use std::time::Duration;

/// Text-generation provider configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// Base URL of the OpenAI-compatible API, without a trailing slash.
    pub base_url: String,
    /// Bearer token. Empty means no `Authorization` header is sent.
    pub api_key: String,
    pub model: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl AiConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var           | Default                     |
    /// |-------------------|-----------------------------|
    /// | `AI_BASE_URL`     | `https://api.openai.com/v1` |
    /// | `AI_API_KEY`      | (empty)                     |
    /// | `AI_MODEL`        | `gpt-4o-mini`               |
    /// | `AI_TIMEOUT_SECS` | `120`                       |
    pub fn from_env() -> Self {
        let base_url = std::env::var("AI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".into())
            .trim_end_matches('/')
            .to_string();

        let api_key = std::env::var("AI_API_KEY").unwrap_or_default();

        let model = std::env::var("AI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());

        let timeout_secs: u64 = std::env::var("AI_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".into())
            .parse()
            .expect("AI_TIMEOUT_SECS must be a valid u64");

        Self {
            base_url,
            api_key,
            model,
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}
