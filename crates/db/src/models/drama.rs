//! Drama and episode models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use dramagen_core::types::{DbId, Timestamp};

/// A row from the `dramas` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Drama {
    pub id: DbId,
    pub title: String,
    pub default_style: Option<String>,
    pub default_prop_style: Option<String>,
    pub default_prop_ratio: Option<String>,
    pub default_image_ratio: Option<String>,
    pub default_image_size: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new drama.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateDrama {
    pub title: String,
    pub default_style: Option<String>,
    pub default_prop_style: Option<String>,
    pub default_prop_ratio: Option<String>,
    pub default_image_ratio: Option<String>,
    pub default_image_size: Option<String>,
}

/// A row from the `episodes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Episode {
    pub id: DbId,
    pub drama_id: DbId,
    pub title: String,
    pub script_content: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new episode.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEpisode {
    pub drama_id: DbId,
    pub title: String,
    pub script_content: Option<String>,
}

impl From<Drama> for dramagen_core::entities::Drama {
    fn from(row: Drama) -> Self {
        Self {
            id: row.id,
            default_style: row.default_style,
            default_prop_style: row.default_prop_style,
            default_prop_ratio: row.default_prop_ratio,
            default_image_ratio: row.default_image_ratio,
            default_image_size: row.default_image_size,
        }
    }
}

impl From<Episode> for dramagen_core::entities::Episode {
    fn from(row: Episode) -> Self {
        Self {
            id: row.id,
            drama_id: row.drama_id,
            script_content: row.script_content,
        }
    }
}
