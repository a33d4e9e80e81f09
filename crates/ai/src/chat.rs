//! Chat completion client.
//!
//! Sends a single non-streaming `POST {base_url}/chat/completions` request
//! and returns the first choice's message content.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use dramagen_core::error::CoreError;
use dramagen_core::providers::{GenerateOptions, ResponseFormat, TextGenerator};

use crate::config::AiConfig;

/// HTTP client for one OpenAI-compatible endpoint.
#[derive(Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

/// Errors from the chat completion layer.
#[derive(Debug, thiserror::Error)]
pub enum AiApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("AI API error ({status}): {body}")]
    ApiError { status: u16, body: String },

    /// The provider answered without any message content.
    #[error("AI API returned no content")]
    EmptyResponse,
}

impl From<AiApiError> for CoreError {
    fn from(err: AiApiError) -> Self {
        CoreError::Upstream(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormatBody>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormatBody {
    #[serde(rename = "type")]
    kind: ResponseFormat,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatResponse {
    /// Content of the first choice, if it has any.
    fn into_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

impl ChatClient {
    /// Build a client with its own connection pool and the configured timeout.
    pub fn new(config: &AiConfig) -> Result<Self, AiApiError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self::with_client(client, config))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: &AiConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    /// Run one chat completion and return the reply text.
    pub async fn complete(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        options: &GenerateOptions,
    ) -> Result<String, AiApiError> {
        let body = build_request(&self.model, prompt, system_prompt, options);

        let mut request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&body);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request.send().await?;
        let parsed: ChatResponse = Self::parse_response(response).await?;

        parsed.into_content().ok_or(AiApiError::EmptyResponse)
    }

    // ---- private helpers ----

    /// Return the response unchanged on success, or an [`AiApiError::ApiError`]
    /// carrying the status and body text.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, AiApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(AiApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, AiApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

pub(crate) fn build_request<'a>(
    model: &'a str,
    prompt: &'a str,
    system_prompt: Option<&'a str>,
    options: &GenerateOptions,
) -> ChatRequest<'a> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = system_prompt.filter(|s| !s.is_empty()) {
        messages.push(ChatMessage {
            role: "system",
            content: system,
        });
    }
    messages.push(ChatMessage {
        role: "user",
        content: prompt,
    });

    ChatRequest {
        model,
        messages,
        max_tokens: options.max_tokens,
        temperature: options.temperature,
        response_format: options
            .response_format
            .map(|kind| ResponseFormatBody { kind }),
    }
}

#[async_trait]
impl TextGenerator for ChatClient {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        options: &GenerateOptions,
    ) -> Result<String, CoreError> {
        match self.complete(prompt, system_prompt, options).await {
            Ok(text) => Ok(text),
            Err(e) => {
                tracing::warn!(error = %e, model = %self.model, "Text generation failed");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn request_without_system_prompt_has_single_user_message() {
        let options = GenerateOptions::default().with_max_tokens(2000);
        let body = serde_json::to_value(build_request("m", "hello", None, &options)).unwrap();
        assert_eq!(
            body,
            json!({
                "model": "m",
                "messages": [{"role": "user", "content": "hello"}],
                "max_tokens": 2000,
            })
        );
    }

    #[test]
    fn request_carries_system_prompt_and_json_format() {
        let options = GenerateOptions::default()
            .with_temperature(0.5)
            .with_response_format(ResponseFormat::JsonObject);
        let body =
            serde_json::to_value(build_request("m", "describe", Some("be terse"), &options))
                .unwrap();
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "be terse");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["temperature"], 0.5);
        assert_eq!(body["response_format"], json!({"type": "json_object"}));
        assert!(body.get("max_tokens").is_none());
    }

    #[test]
    fn empty_system_prompt_is_omitted() {
        let body = serde_json::to_value(build_request(
            "m",
            "hi",
            Some(""),
            &GenerateOptions::default(),
        ))
        .unwrap();
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn first_choice_content_is_returned() {
        let parsed: ChatResponse = serde_json::from_value(json!({
            "choices": [
                {"message": {"role": "assistant", "content": "[{\"name\": \"Wave\"}]"}},
                {"message": {"role": "assistant", "content": "ignored"}}
            ]
        }))
        .unwrap();
        assert_eq!(parsed.into_content().as_deref(), Some("[{\"name\": \"Wave\"}]"));
    }

    #[test]
    fn missing_or_blank_content_is_none() {
        let empty: ChatResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(empty.into_content().is_none());

        let blank: ChatResponse = serde_json::from_value(json!({
            "choices": [{"message": {"content": "  "}}]
        }))
        .unwrap();
        assert!(blank.into_content().is_none());
    }

    #[test]
    fn api_errors_become_upstream() {
        let err: CoreError = AiApiError::ApiError {
            status: 429,
            body: "rate limited".into(),
        }
        .into();
        assert!(matches!(err, CoreError::Upstream(msg) if msg.contains("429")));
    }
}
