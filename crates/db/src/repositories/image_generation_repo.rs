//! Repository for the `image_generations` queue table.
//!
//! The pose pipeline inserts pending rows and polls them by id. An image
//! worker claims rows with `FOR UPDATE SKIP LOCKED` and finishes them with
//! [`ImageGenerationRepo::complete`] or [`ImageGenerationRepo::fail`].

use sqlx::PgPool;
use dramagen_core::image_generation::ImageRequest;
use dramagen_core::types::DbId;

use crate::models::image_generation::ImageGeneration;
use crate::models::status::ImageGenerationStatusId;

/// Column list for `image_generations` queries.
const COLUMNS: &str = "\
    id, drama_id, image_type, prompt, size, provider, status_id, \
    image_url, error_message, claimed_at, completed_at, created_at, updated_at";

pub struct ImageGenerationRepo;

impl ImageGenerationRepo {
    /// Insert a pending generation request.
    pub async fn create(
        pool: &PgPool,
        input: &ImageRequest,
    ) -> Result<ImageGeneration, sqlx::Error> {
        let query = format!(
            "INSERT INTO image_generations (drama_id, image_type, prompt, size, provider, status_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ImageGeneration>(&query)
            .bind(input.drama_id)
            .bind(&input.image_type)
            .bind(&input.prompt)
            .bind(&input.size)
            .bind(&input.provider)
            .bind(ImageGenerationStatusId::Pending.id())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ImageGeneration>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM image_generations WHERE id = $1");
        sqlx::query_as::<_, ImageGeneration>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Atomically claim the oldest pending request and mark it processing.
    pub async fn claim_next(pool: &PgPool) -> Result<Option<ImageGeneration>, sqlx::Error> {
        let query = format!(
            "UPDATE image_generations \
             SET claimed_at = NOW(), status_id = $1 \
             WHERE id = ( \
                 SELECT id FROM image_generations \
                 WHERE status_id = $2 AND claimed_at IS NULL \
                 ORDER BY created_at ASC, id ASC \
                 LIMIT 1 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ImageGeneration>(&query)
            .bind(ImageGenerationStatusId::Processing.id())
            .bind(ImageGenerationStatusId::Pending.id())
            .fetch_optional(pool)
            .await
    }

    /// Mark a request completed with the produced image url.
    pub async fn complete(pool: &PgPool, id: DbId, image_url: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE image_generations \
             SET status_id = $2, image_url = $3, completed_at = NOW() \
             WHERE id = $1 AND status_id NOT IN ($4, $5)",
        )
        .bind(id)
        .bind(ImageGenerationStatusId::Completed.id())
        .bind(image_url)
        .bind(ImageGenerationStatusId::Completed.id())
        .bind(ImageGenerationStatusId::Failed.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark a request failed with the provider's error message.
    pub async fn fail(pool: &PgPool, id: DbId, error: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE image_generations \
             SET status_id = $2, error_message = $3, completed_at = NOW() \
             WHERE id = $1 AND status_id NOT IN ($4, $5)",
        )
        .bind(id)
        .bind(ImageGenerationStatusId::Failed.id())
        .bind(error)
        .bind(ImageGenerationStatusId::Completed.id())
        .bind(ImageGenerationStatusId::Failed.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
