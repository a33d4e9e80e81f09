//! HTTP client for an OpenAI-compatible chat completion endpoint.
//!
//! [`ChatClient`] implements [`dramagen_core::providers::TextGenerator`] so
//! the pipelines can call the model without knowing about HTTP.

pub mod chat;
pub mod config;

pub use chat::{AiApiError, ChatClient};
pub use config::AiConfig;
