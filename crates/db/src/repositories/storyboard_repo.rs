//! Repository for the `storyboards` table and its pose associations.

use sqlx::PgPool;
use dramagen_core::types::DbId;

use crate::models::storyboard::Storyboard;

const COLUMNS: &str = "id, episode_id, title, created_at, updated_at";

/// Provides storyboard lookups and pose association management.
pub struct StoryboardRepo;

impl StoryboardRepo {
    pub async fn create(
        pool: &PgPool,
        episode_id: DbId,
        title: Option<&str>,
    ) -> Result<Storyboard, sqlx::Error> {
        let query = format!(
            "INSERT INTO storyboards (episode_id, title)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Storyboard>(&query)
            .bind(episode_id)
            .bind(title)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Storyboard>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM storyboards WHERE id = $1");
        sqlx::query_as::<_, Storyboard>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Replace the storyboard's pose set in a single transaction.
    ///
    /// Duplicate ids in `pose_ids` are collapsed and ids with no matching
    /// pose are ignored.
    pub async fn replace_poses(
        pool: &PgPool,
        storyboard_id: DbId,
        pose_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM storyboard_poses WHERE storyboard_id = $1")
            .bind(storyboard_id)
            .execute(&mut *tx)
            .await?;

        if !pose_ids.is_empty() {
            sqlx::query(
                "INSERT INTO storyboard_poses (storyboard_id, pose_id)
                 SELECT $1, p.id FROM poses p WHERE p.id = ANY($2)
                 ON CONFLICT (storyboard_id, pose_id) DO NOTHING",
            )
            .bind(storyboard_id)
            .bind(pose_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await
    }

    /// Pose ids attached to a storyboard, ascending.
    pub async fn list_pose_ids(
        pool: &PgPool,
        storyboard_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT pose_id FROM storyboard_poses WHERE storyboard_id = $1 ORDER BY pose_id ASC",
        )
        .bind(storyboard_id)
        .fetch_all(pool)
        .await
    }
}
