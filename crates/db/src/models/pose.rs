//! Pose entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use dramagen_core::types::{DbId, Timestamp};

/// A row from the `poses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Pose {
    pub id: DbId,
    pub drama_id: DbId,
    pub name: String,
    #[serde(rename = "type")]
    pub pose_type: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new pose.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePose {
    pub drama_id: DbId,
    pub name: String,
    #[serde(rename = "type")]
    pub pose_type: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// DTO for updating an existing pose. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePose {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub pose_type: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl From<Pose> for dramagen_core::entities::Pose {
    fn from(row: Pose) -> Self {
        Self {
            id: row.id,
            drama_id: row.drama_id,
            name: row.name,
            pose_type: row.pose_type,
            description: row.description,
            image_url: row.image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<&dramagen_core::entities::NewPose> for CreatePose {
    fn from(input: &dramagen_core::entities::NewPose) -> Self {
        Self {
            drama_id: input.drama_id,
            name: input.name.clone(),
            pose_type: input.pose_type.clone(),
            description: input.description.clone(),
            image_url: None,
        }
    }
}
