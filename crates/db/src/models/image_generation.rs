//! Downstream image generation record model.

use serde::Serialize;
use sqlx::FromRow;
use dramagen_core::error::CoreError;
use dramagen_core::image_generation::{GenerationSnapshot, GenerationStatus};
use dramagen_core::types::{DbId, Timestamp};

use super::status::{ImageGenerationStatusId, StatusId};

/// A row from the `image_generations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ImageGeneration {
    pub id: DbId,
    pub drama_id: DbId,
    pub image_type: String,
    pub prompt: String,
    pub size: String,
    pub provider: String,
    pub status_id: StatusId,
    pub image_url: Option<String>,
    pub error_message: Option<String>,
    pub claimed_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<ImageGeneration> for GenerationSnapshot {
    type Error = CoreError;

    fn try_from(row: ImageGeneration) -> Result<Self, Self::Error> {
        let status = ImageGenerationStatusId::from_id(row.status_id)
            .map(GenerationStatus::from)
            .ok_or_else(|| {
                CoreError::Internal(format!(
                    "Unknown image generation status id {}",
                    row.status_id
                ))
            })?;

        Ok(GenerationSnapshot {
            id: row.id,
            status,
            image_url: row.image_url,
            error_message: row.error_message,
        })
    }
}
