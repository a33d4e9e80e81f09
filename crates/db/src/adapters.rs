//! Postgres-backed implementations of the `dramagen_core` store contracts.
//!
//! Each adapter is a thin wrapper over a repository; sqlx errors are folded
//! into [`CoreError`] by [`map_db_err`].

use async_trait::async_trait;
use dramagen_core::entities::{Drama, Episode, NewPose, Pose};
use dramagen_core::error::CoreError;
use dramagen_core::image_generation::{GenerationSnapshot, ImageRequest};
use dramagen_core::providers::{GenerationStatusStore, ImageSubmitter};
use dramagen_core::stores::{PoseStore, ScriptSource, TaskLedger};
use dramagen_core::task::{Task, TaskKind, TaskStatus};
use dramagen_core::types::{DbId, TaskId};

use crate::models::pose::CreatePose;
use crate::repositories::{
    DramaRepo, EpisodeRepo, ImageGenerationRepo, PoseRepo, TaskRepo,
};
use crate::DbPool;

/// PostgreSQL unique constraint violation.
const UNIQUE_VIOLATION: &str = "23505";

/// Fold a sqlx error into the domain error type.
///
/// Unique violations become [`CoreError::Conflict`] naming the constraint;
/// everything else is [`CoreError::Internal`].
pub fn map_db_err(err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            let constraint = db_err.constraint().unwrap_or("unknown");
            return CoreError::Conflict(format!(
                "Duplicate value violates unique constraint: {constraint}"
            ));
        }
    }
    CoreError::Internal(format!("Database error: {err}"))
}

// ---------------------------------------------------------------------------
// Task ledger
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct PgTaskLedger {
    pool: DbPool,
}

impl PgTaskLedger {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskLedger for PgTaskLedger {
    async fn create(&self, kind: TaskKind, subject_ref: &str) -> Result<Task, CoreError> {
        let row = TaskRepo::create(&self.pool, kind, subject_ref)
            .await
            .map_err(map_db_err)?;
        Task::try_from(row)
    }

    async fn update_status(
        &self,
        id: TaskId,
        status: TaskStatus,
        progress: i16,
        message: &str,
    ) -> Result<bool, CoreError> {
        TaskRepo::update_status(&self.pool, id, status, progress, message)
            .await
            .map_err(map_db_err)
    }

    async fn complete(&self, id: TaskId, result: &serde_json::Value) -> Result<bool, CoreError> {
        TaskRepo::complete(&self.pool, id, result)
            .await
            .map_err(map_db_err)
    }

    async fn fail(&self, id: TaskId, error: &str) -> Result<bool, CoreError> {
        TaskRepo::fail(&self.pool, id, error)
            .await
            .map_err(map_db_err)
    }

    async fn get(&self, id: TaskId) -> Result<Option<Task>, CoreError> {
        TaskRepo::find_by_id(&self.pool, id)
            .await
            .map_err(map_db_err)?
            .map(Task::try_from)
            .transpose()
    }
}

// ---------------------------------------------------------------------------
// Poses and scripts
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct PgPoseStore {
    pool: DbPool,
}

impl PgPoseStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PoseStore for PgPoseStore {
    async fn find(&self, id: DbId) -> Result<Option<Pose>, CoreError> {
        let row = PoseRepo::find_by_id(&self.pool, id)
            .await
            .map_err(map_db_err)?;
        Ok(row.map(Pose::from))
    }

    async fn exists_by_name(&self, drama_id: DbId, name: &str) -> Result<bool, CoreError> {
        PoseRepo::exists_by_name(&self.pool, drama_id, name)
            .await
            .map_err(map_db_err)
    }

    async fn create(&self, input: &NewPose) -> Result<Pose, CoreError> {
        let row = PoseRepo::create(&self.pool, &CreatePose::from(input))
            .await
            .map_err(map_db_err)?;
        Ok(row.into())
    }

    async fn set_image_url(&self, id: DbId, image_url: &str) -> Result<bool, CoreError> {
        PoseRepo::set_image_url(&self.pool, id, image_url)
            .await
            .map_err(map_db_err)
    }
}

#[derive(Clone)]
pub struct PgScriptSource {
    pool: DbPool,
}

impl PgScriptSource {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScriptSource for PgScriptSource {
    async fn find_episode(&self, id: DbId) -> Result<Option<Episode>, CoreError> {
        let row = EpisodeRepo::find_by_id(&self.pool, id)
            .await
            .map_err(map_db_err)?;
        Ok(row.map(Episode::from))
    }

    async fn find_drama(&self, id: DbId) -> Result<Option<Drama>, CoreError> {
        let row = DramaRepo::find_by_id(&self.pool, id)
            .await
            .map_err(map_db_err)?;
        Ok(row.map(Drama::from))
    }
}

// ---------------------------------------------------------------------------
// Image generation queue
// ---------------------------------------------------------------------------

/// Submits image requests to the `image_generations` queue and reads them
/// back for polling.
#[derive(Clone)]
pub struct PgImageQueue {
    pool: DbPool,
}

impl PgImageQueue {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ImageSubmitter for PgImageQueue {
    async fn submit(&self, request: &ImageRequest) -> Result<DbId, CoreError> {
        let row = ImageGenerationRepo::create(&self.pool, request)
            .await
            .map_err(map_db_err)?;
        tracing::debug!(generation_id = row.id, drama_id = row.drama_id, "Image generation queued");
        Ok(row.id)
    }
}

#[async_trait]
impl GenerationStatusStore for PgImageQueue {
    async fn load(&self, generation_id: DbId) -> Result<GenerationSnapshot, CoreError> {
        ImageGenerationRepo::find_by_id(&self.pool, generation_id)
            .await
            .map_err(map_db_err)?
            .ok_or_else(|| CoreError::not_found("ImageGeneration", generation_id))?
            .try_into()
    }
}
