//! Storage contracts shared by the pipelines.
//!
//! Every mutation is expected to be a single atomic operation at the storage
//! layer; no in-process lock coordinates concurrent pipelines.

use async_trait::async_trait;

use crate::entities::{Drama, Episode, NewPose, Pose};
use crate::error::CoreError;
use crate::task::{Task, TaskKind, TaskStatus};
use crate::types::{DbId, TaskId};

/// The polled record of every background task.
///
/// Mutators return `Ok(false)` when the task is already terminal (or
/// unknown) and nothing was written.
#[async_trait]
pub trait TaskLedger: Send + Sync {
    async fn create(&self, kind: TaskKind, subject_ref: &str) -> Result<Task, CoreError>;

    async fn update_status(
        &self,
        id: TaskId,
        status: TaskStatus,
        progress: i16,
        message: &str,
    ) -> Result<bool, CoreError>;

    async fn complete(&self, id: TaskId, result: &serde_json::Value) -> Result<bool, CoreError>;

    async fn fail(&self, id: TaskId, error: &str) -> Result<bool, CoreError>;

    async fn get(&self, id: TaskId) -> Result<Option<Task>, CoreError>;
}

/// Pose persistence used by both pipelines.
#[async_trait]
pub trait PoseStore: Send + Sync {
    async fn find(&self, id: DbId) -> Result<Option<Pose>, CoreError>;

    async fn exists_by_name(&self, drama_id: DbId, name: &str) -> Result<bool, CoreError>;

    /// Insert a pose. A duplicate `(drama_id, name)` is reported as
    /// [`CoreError::Conflict`].
    async fn create(&self, input: &NewPose) -> Result<Pose, CoreError>;

    /// Returns `false` when the pose no longer exists.
    async fn set_image_url(&self, id: DbId, image_url: &str) -> Result<bool, CoreError>;
}

/// Read access to episodes and their parent dramas.
#[async_trait]
pub trait ScriptSource: Send + Sync {
    async fn find_episode(&self, id: DbId) -> Result<Option<Episode>, CoreError>;

    async fn find_drama(&self, id: DbId) -> Result<Option<Drama>, CoreError>;
}
