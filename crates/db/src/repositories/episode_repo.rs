//! Repository for the `episodes` table.

use sqlx::PgPool;
use dramagen_core::types::DbId;

use crate::models::drama::{CreateEpisode, Episode};

const COLUMNS: &str = "id, drama_id, title, script_content, created_at, updated_at";

/// Provides read and insert operations for episodes.
pub struct EpisodeRepo;

impl EpisodeRepo {
    pub async fn create(pool: &PgPool, input: &CreateEpisode) -> Result<Episode, sqlx::Error> {
        let query = format!(
            "INSERT INTO episodes (drama_id, title, script_content)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Episode>(&query)
            .bind(input.drama_id)
            .bind(&input.title)
            .bind(&input.script_content)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Episode>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM episodes WHERE id = $1");
        sqlx::query_as::<_, Episode>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
