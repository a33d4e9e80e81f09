//! Repository for the `poses` table.

use sqlx::PgPool;
use dramagen_core::types::DbId;

use crate::models::pose::{CreatePose, Pose, UpdatePose};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, drama_id, name, pose_type, description, image_url, created_at, updated_at";

/// Provides CRUD operations for poses.
pub struct PoseRepo;

impl PoseRepo {
    /// Insert a new pose, returning the created row.
    ///
    /// A duplicate `(drama_id, name)` fails with a unique violation on
    /// `uq_poses_drama_id_name`.
    pub async fn create(pool: &PgPool, input: &CreatePose) -> Result<Pose, sqlx::Error> {
        let query = format!(
            "INSERT INTO poses (drama_id, name, pose_type, description, image_url)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Pose>(&query)
            .bind(input.drama_id)
            .bind(&input.name)
            .bind(&input.pose_type)
            .bind(&input.description)
            .bind(&input.image_url)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Pose>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM poses WHERE id = $1");
        sqlx::query_as::<_, Pose>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all poses for a drama, oldest first.
    pub async fn list_by_drama(pool: &PgPool, drama_id: DbId) -> Result<Vec<Pose>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM poses
             WHERE drama_id = $1
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Pose>(&query)
            .bind(drama_id)
            .fetch_all(pool)
            .await
    }

    /// Whether a pose with this exact name exists in the drama.
    pub async fn exists_by_name(
        pool: &PgPool,
        drama_id: DbId,
        name: &str,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM poses WHERE drama_id = $1 AND name = $2)",
        )
        .bind(drama_id)
        .bind(name)
        .fetch_one(pool)
        .await
    }

    /// Update a pose. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePose,
    ) -> Result<Option<Pose>, sqlx::Error> {
        let query = format!(
            "UPDATE poses SET
                name = COALESCE($2, name),
                pose_type = COALESCE($3, pose_type),
                description = COALESCE($4, description),
                image_url = COALESCE($5, image_url)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Pose>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.pose_type)
            .bind(&input.description)
            .bind(&input.image_url)
            .fetch_optional(pool)
            .await
    }

    /// Store the generated image url. Returns `false` if the pose is gone.
    pub async fn set_image_url(
        pool: &PgPool,
        id: DbId,
        image_url: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE poses SET image_url = $2 WHERE id = $1")
            .bind(id)
            .bind(image_url)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a pose. Storyboard associations cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM poses WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
