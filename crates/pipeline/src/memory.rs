//! In-memory stores backing the pipeline tests.
//!
//! Each mutation happens under one write guard, so readers never observe
//! a half-applied update.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dramagen_core::entities::{Drama, Episode, NewPose, Pose};
use dramagen_core::error::CoreError;
use dramagen_core::stores::{PoseStore, ScriptSource, TaskLedger};
use dramagen_core::task::{Task, TaskKind, TaskStatus};
use dramagen_core::types::{DbId, TaskId};
use tokio::sync::RwLock;

// ---------------------------------------------------------------------------
// Task ledger
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryTaskLedger {
    tasks: RwLock<HashMap<TaskId, Task>>,
}

impl MemoryTaskLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tasks.read().await.is_empty()
    }

    pub async fn all(&self) -> Vec<Task> {
        self.tasks.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl TaskLedger for MemoryTaskLedger {
    async fn create(&self, kind: TaskKind, subject_ref: &str) -> Result<Task, CoreError> {
        let task = Task::new(kind, subject_ref);
        self.tasks.write().await.insert(task.id, task.clone());
        Ok(task)
    }

    async fn update_status(
        &self,
        id: TaskId,
        status: TaskStatus,
        progress: i16,
        message: &str,
    ) -> Result<bool, CoreError> {
        let mut tasks = self.tasks.write().await;
        Ok(tasks
            .get_mut(&id)
            .is_some_and(|t| t.apply_status(status, progress, message)))
    }

    async fn complete(&self, id: TaskId, result: &serde_json::Value) -> Result<bool, CoreError> {
        let mut tasks = self.tasks.write().await;
        Ok(tasks
            .get_mut(&id)
            .is_some_and(|t| t.apply_result(result.clone())))
    }

    async fn fail(&self, id: TaskId, error: &str) -> Result<bool, CoreError> {
        let mut tasks = self.tasks.write().await;
        Ok(tasks.get_mut(&id).is_some_and(|t| t.apply_error(error)))
    }

    async fn get(&self, id: TaskId) -> Result<Option<Task>, CoreError> {
        Ok(self.tasks.read().await.get(&id).cloned())
    }
}

// ---------------------------------------------------------------------------
// Poses
// ---------------------------------------------------------------------------

/// Pose store enforcing the `(drama_id, name)` uniqueness rule.
pub struct MemoryPoseStore {
    poses: RwLock<Vec<Pose>>,
    next_id: AtomicI64,
}

impl Default for MemoryPoseStore {
    fn default() -> Self {
        Self {
            poses: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl MemoryPoseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Poses of a drama in insertion order.
    pub async fn list_by_drama(&self, drama_id: DbId) -> Vec<Pose> {
        self.poses
            .read()
            .await
            .iter()
            .filter(|p| p.drama_id == drama_id)
            .cloned()
            .collect()
    }

    pub async fn count_named(&self, drama_id: DbId, name: &str) -> usize {
        self.poses
            .read()
            .await
            .iter()
            .filter(|p| p.drama_id == drama_id && p.name == name)
            .count()
    }
}

#[async_trait]
impl PoseStore for MemoryPoseStore {
    async fn find(&self, id: DbId) -> Result<Option<Pose>, CoreError> {
        Ok(self.poses.read().await.iter().find(|p| p.id == id).cloned())
    }

    async fn exists_by_name(&self, drama_id: DbId, name: &str) -> Result<bool, CoreError> {
        Ok(self
            .poses
            .read()
            .await
            .iter()
            .any(|p| p.drama_id == drama_id && p.name == name))
    }

    async fn create(&self, input: &NewPose) -> Result<Pose, CoreError> {
        let mut poses = self.poses.write().await;
        if poses
            .iter()
            .any(|p| p.drama_id == input.drama_id && p.name == input.name)
        {
            return Err(CoreError::Conflict(format!(
                "pose '{}' already exists in drama {}",
                input.name, input.drama_id
            )));
        }

        let now = chrono::Utc::now();
        let pose = Pose {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            drama_id: input.drama_id,
            name: input.name.clone(),
            pose_type: input.pose_type.clone(),
            description: input.description.clone(),
            image_url: None,
            created_at: now,
            updated_at: now,
        };
        poses.push(pose.clone());
        Ok(pose)
    }

    async fn set_image_url(&self, id: DbId, image_url: &str) -> Result<bool, CoreError> {
        let mut poses = self.poses.write().await;
        match poses.iter_mut().find(|p| p.id == id) {
            Some(pose) => {
                pose.image_url = Some(image_url.to_string());
                pose.updated_at = chrono::Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// ---------------------------------------------------------------------------
// Episodes and dramas
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryScriptSource {
    episodes: RwLock<HashMap<DbId, Episode>>,
    dramas: RwLock<HashMap<DbId, Drama>>,
}

impl MemoryScriptSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_episode(&self, episode: Episode) {
        self.episodes.write().await.insert(episode.id, episode);
    }

    pub async fn insert_drama(&self, drama: Drama) {
        self.dramas.write().await.insert(drama.id, drama);
    }
}

#[async_trait]
impl ScriptSource for MemoryScriptSource {
    async fn find_episode(&self, id: DbId) -> Result<Option<Episode>, CoreError> {
        Ok(self.episodes.read().await.get(&id).cloned())
    }

    async fn find_drama(&self, id: DbId) -> Result<Option<Drama>, CoreError> {
        Ok(self.dramas.read().await.get(&id).cloned())
    }
}
