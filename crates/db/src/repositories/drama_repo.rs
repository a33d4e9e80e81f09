//! Repository for the `dramas` table.

use sqlx::PgPool;
use dramagen_core::types::DbId;

use crate::models::drama::{CreateDrama, Drama};

const COLUMNS: &str = "id, title, default_style, default_prop_style, default_prop_ratio, \
     default_image_ratio, default_image_size, created_at, updated_at";

/// Provides read and insert operations for dramas.
pub struct DramaRepo;

impl DramaRepo {
    pub async fn create(pool: &PgPool, input: &CreateDrama) -> Result<Drama, sqlx::Error> {
        let query = format!(
            "INSERT INTO dramas (title, default_style, default_prop_style, default_prop_ratio, \
                 default_image_ratio, default_image_size)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Drama>(&query)
            .bind(&input.title)
            .bind(&input.default_style)
            .bind(&input.default_prop_style)
            .bind(&input.default_prop_ratio)
            .bind(&input.default_image_ratio)
            .bind(&input.default_image_size)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Drama>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM dramas WHERE id = $1");
        sqlx::query_as::<_, Drama>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
