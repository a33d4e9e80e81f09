//! Storyboard model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use dramagen_core::types::{DbId, Timestamp};

/// A row from the `storyboards` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Storyboard {
    pub id: DbId,
    pub episode_id: DbId,
    pub title: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for replacing the poses attached to a storyboard.
#[derive(Debug, Clone, Deserialize)]
pub struct AssociatePoses {
    pub pose_ids: Vec<DbId>,
}
