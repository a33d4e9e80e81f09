//! Image generation request construction, size resolution, and the bounded
//! polling policy used while waiting on the downstream generation record.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Fallback image size when neither configuration nor the drama sets one.
pub const DEFAULT_IMAGE_SIZE: &str = "1024x1024";

/// Image-type tag attached to pose generation requests.
pub const POSE_IMAGE_TYPE: &str = "pose";

/// Appended to every pose prompt so the provider renders a skeleton reference.
pub const POSE_PROMPT_SUFFIX: &str = ", standard motion-capture skeleton diagram";

/// Progress message while the image is being generated.
pub const MSG_GENERATING_IMAGE: &str = "generating image";

/// Progress reported on the first poll attempt; each attempt adds one.
pub const POLL_PROGRESS_BASE: i16 = 10;

/// Highest progress a still-running generation may report.
pub const POLL_PROGRESS_CEILING: i16 = 99;

/// Task error when the provider fails without a message.
pub const GENERIC_GENERATION_ERROR: &str = "image generation failed";

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_POLL_MAX_ATTEMPTS: u32 = 60;

// ---------------------------------------------------------------------------
// Size resolution
// ---------------------------------------------------------------------------

/// Resolve the target image size.
///
/// Precedence, highest first: drama override, configured global default,
/// [`DEFAULT_IMAGE_SIZE`]. Blank values are treated as unset.
pub fn resolve_image_size(global: Option<&str>, drama: Option<&str>) -> String {
    [drama, global]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(DEFAULT_IMAGE_SIZE)
        .to_string()
}

/// Build the provider prompt for a pose description.
pub fn build_pose_image_prompt(description: &str) -> String {
    format!("{}{POSE_PROMPT_SUFFIX}", description.trim())
}

// ---------------------------------------------------------------------------
// Downstream request / record
// ---------------------------------------------------------------------------

/// A submission to the image-generation collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRequest {
    pub drama_id: DbId,
    pub image_type: String,
    pub prompt: String,
    pub size: String,
    pub provider: String,
}

/// Lifecycle of a downstream generation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl GenerationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::str::FromStr for GenerationStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(CoreError::Validation(format!(
                "Unknown generation status '{other}'"
            ))),
        }
    }
}

/// What one poll observes of a generation record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSnapshot {
    pub id: DbId,
    pub status: GenerationStatus,
    pub image_url: Option<String>,
    pub error_message: Option<String>,
}

impl GenerationSnapshot {
    /// The image url, only when the record is completed with a non-empty url.
    pub fn completed_url(&self) -> Option<&str> {
        if self.status != GenerationStatus::Completed {
            return None;
        }
        self.image_url.as_deref().filter(|u| !u.trim().is_empty())
    }
}

// ---------------------------------------------------------------------------
// Polling
// ---------------------------------------------------------------------------

/// Bounded polling schedule.
///
/// With `backoff_factor == 1.0` every wait equals `interval`; larger factors
/// grow the wait geometrically, capped at `max_interval`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
    pub backoff_factor: f64,
    pub max_interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_POLL_MAX_ATTEMPTS,
            backoff_factor: 1.0,
            max_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl PollPolicy {
    /// Wait before the 0-based `attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if self.backoff_factor <= 1.0 {
            return self.interval;
        }
        let scaled = self.interval.as_secs_f64() * self.backoff_factor.powi(attempt as i32);
        let cap = self.max_interval.max(self.interval);
        Duration::try_from_secs_f64(scaled)
            .map(|d| d.min(cap))
            .unwrap_or(cap)
    }

    /// Upper bound on total time spent waiting.
    pub fn ceiling(&self) -> Duration {
        (0..self.max_attempts).map(|a| self.delay_for(a)).sum()
    }
}

/// Task progress reported after the 0-based `attempt` found no terminal state.
pub fn progress_for_attempt(attempt: u32) -> i16 {
    let attempt = i16::try_from(attempt).unwrap_or(i16::MAX);
    POLL_PROGRESS_BASE
        .saturating_add(attempt)
        .min(POLL_PROGRESS_CEILING)
}

/// Error text recorded when polling runs out of attempts.
pub fn timeout_message(max_attempts: u32) -> String {
    format!("image generation timed out after {max_attempts} attempts")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
