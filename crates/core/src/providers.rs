//! Contracts for the AI collaborators the pipelines call out to.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::CoreError;
use crate::image_generation::{GenerationSnapshot, ImageRequest};
use crate::types::DbId;

/// Response-format hint passed to the text model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    Text,
    JsonObject,
}

/// Per-call options for [`TextGenerator::generate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateOptions {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub response_format: Option<ResponseFormat>,
}

impl GenerateOptions {
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }
}

/// Non-streaming text generation.
///
/// Implementations report transport and provider failures as
/// [`CoreError::Upstream`].
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        options: &GenerateOptions,
    ) -> Result<String, CoreError>;
}

/// Accepts image-generation requests and returns the downstream record id.
#[async_trait]
pub trait ImageSubmitter: Send + Sync {
    async fn submit(&self, request: &ImageRequest) -> Result<DbId, CoreError>;
}

/// Read access to downstream generation records.
#[async_trait]
pub trait GenerationStatusStore: Send + Sync {
    async fn load(&self, generation_id: DbId) -> Result<GenerationSnapshot, CoreError>;
}
