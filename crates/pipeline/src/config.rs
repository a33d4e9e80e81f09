use std::time::Duration;

use dramagen_core::image_generation::{PollPolicy, DEFAULT_POLL_INTERVAL, DEFAULT_POLL_MAX_ATTEMPTS};
use dramagen_core::pose_extraction::DEFAULT_EXTRACTION_MAX_TOKENS;

/// Default ceiling on concurrently running pipelines.
pub const DEFAULT_MAX_CONCURRENT_TASKS: usize = 16;

/// Provider tag sent with image requests when none is configured.
pub const DEFAULT_IMAGE_PROVIDER: &str = "openai";

/// Settings shared by the pose pipelines.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Maximum pipelines executing at once; further work waits for a slot.
    pub max_concurrent_tasks: usize,
    /// Polling schedule for image generation records.
    pub poll: PollPolicy,
    /// Global image size, overridden per drama.
    pub default_image_size: Option<String>,
    pub default_image_provider: String,
    /// Output token ceiling for script extraction.
    pub extraction_max_tokens: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_tasks: DEFAULT_MAX_CONCURRENT_TASKS,
            poll: PollPolicy::default(),
            default_image_size: None,
            default_image_provider: DEFAULT_IMAGE_PROVIDER.to_string(),
            extraction_max_tokens: DEFAULT_EXTRACTION_MAX_TOKENS,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default          |
    /// |-------------------------------|------------------|
    /// | `MAX_CONCURRENT_TASKS`        | `16`             |
    /// | `IMAGE_POLL_INTERVAL_MS`      | `2000`           |
    /// | `IMAGE_POLL_MAX_ATTEMPTS`     | `60`             |
    /// | `IMAGE_POLL_BACKOFF_FACTOR`   | `1.0` (fixed)    |
    /// | `IMAGE_POLL_MAX_INTERVAL_MS`  | poll interval    |
    /// | `DEFAULT_IMAGE_SIZE`          | (unset)          |
    /// | `DEFAULT_IMAGE_PROVIDER`      | `openai`         |
    /// | `EXTRACTION_MAX_TOKENS`       | `2000`           |
    pub fn from_env() -> Self {
        let max_concurrent_tasks: usize = std::env::var("MAX_CONCURRENT_TASKS")
            .unwrap_or_else(|_| DEFAULT_MAX_CONCURRENT_TASKS.to_string())
            .parse()
            .expect("MAX_CONCURRENT_TASKS must be a valid usize");

        let interval_ms: u64 = std::env::var("IMAGE_POLL_INTERVAL_MS")
            .unwrap_or_else(|_| DEFAULT_POLL_INTERVAL.as_millis().to_string())
            .parse()
            .expect("IMAGE_POLL_INTERVAL_MS must be a valid u64");

        let max_attempts: u32 = std::env::var("IMAGE_POLL_MAX_ATTEMPTS")
            .unwrap_or_else(|_| DEFAULT_POLL_MAX_ATTEMPTS.to_string())
            .parse()
            .expect("IMAGE_POLL_MAX_ATTEMPTS must be a valid u32");

        let backoff_factor: f64 = std::env::var("IMAGE_POLL_BACKOFF_FACTOR")
            .unwrap_or_else(|_| "1.0".into())
            .parse()
            .expect("IMAGE_POLL_BACKOFF_FACTOR must be a valid f64");

        let max_interval_ms: u64 = std::env::var("IMAGE_POLL_MAX_INTERVAL_MS")
            .unwrap_or_else(|_| interval_ms.to_string())
            .parse()
            .expect("IMAGE_POLL_MAX_INTERVAL_MS must be a valid u64");

        let default_image_size = std::env::var("DEFAULT_IMAGE_SIZE")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let default_image_provider = std::env::var("DEFAULT_IMAGE_PROVIDER")
            .unwrap_or_else(|_| DEFAULT_IMAGE_PROVIDER.into());

        let extraction_max_tokens: u32 = std::env::var("EXTRACTION_MAX_TOKENS")
            .unwrap_or_else(|_| DEFAULT_EXTRACTION_MAX_TOKENS.to_string())
            .parse()
            .expect("EXTRACTION_MAX_TOKENS must be a valid u32");

        Self {
            max_concurrent_tasks,
            poll: PollPolicy {
                interval: Duration::from_millis(interval_ms),
                max_attempts,
                backoff_factor,
                max_interval: Duration::from_millis(max_interval_ms),
            },
            default_image_size,
            default_image_provider,
            extraction_max_tokens,
        }
    }
}
