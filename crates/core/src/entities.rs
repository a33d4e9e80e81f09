//! Domain records exchanged between the pipelines and their stores.
//!
//! These mirror the persisted rows but carry no storage concerns; the `db`
//! crate converts its `FromRow` models into them.

use serde::Serialize;

use crate::types::{DbId, Timestamp};

/// A pose: a generatable entity whose description doubles as its image prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
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

impl Pose {
    /// The text that drives image generation, if there is any.
    pub fn image_prompt_source(&self) -> Option<&str> {
        self.description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
    }
}

/// Input for creating a pose.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPose {
    pub drama_id: DbId,
    pub name: String,
    pub pose_type: Option<String>,
    pub description: Option<String>,
}

/// The slice of an episode the extraction pipeline reads.
#[derive(Debug, Clone, PartialEq)]
pub struct Episode {
    pub id: DbId,
    pub drama_id: DbId,
    pub script_content: Option<String>,
}

/// Drama-level overrides for prompts and image sizes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Drama {
    pub id: DbId,
    pub default_style: Option<String>,
    pub default_prop_style: Option<String>,
    pub default_prop_ratio: Option<String>,
    pub default_image_ratio: Option<String>,
    pub default_image_size: Option<String>,
}
