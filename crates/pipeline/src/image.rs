//! Pose image generation pipeline.
//!
//! Submits one request to the image queue, then polls the generation record
//! on a bounded schedule until it completes, fails or runs out of attempts.

use std::sync::Arc;

use dramagen_core::entities::Pose;
use dramagen_core::error::CoreError;
use dramagen_core::image_generation::{
    build_pose_image_prompt, progress_for_attempt, resolve_image_size, timeout_message,
    GenerationStatus, ImageRequest, PollPolicy, GENERIC_GENERATION_ERROR, MSG_GENERATING_IMAGE,
    POSE_IMAGE_TYPE,
};
use dramagen_core::providers::{GenerationStatusStore, ImageSubmitter};
use dramagen_core::stores::{PoseStore, ScriptSource, TaskLedger};
use dramagen_core::task::TaskStatus;
use dramagen_core::types::{DbId, TaskId};

use crate::record_failure;

pub struct ImagePipeline {
    ledger: Arc<dyn TaskLedger>,
    poses: Arc<dyn PoseStore>,
    scripts: Arc<dyn ScriptSource>,
    submitter: Arc<dyn ImageSubmitter>,
    statuses: Arc<dyn GenerationStatusStore>,
    policy: PollPolicy,
    default_size: Option<String>,
    provider: String,
}

impl ImagePipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ledger: Arc<dyn TaskLedger>,
        poses: Arc<dyn PoseStore>,
        scripts: Arc<dyn ScriptSource>,
        submitter: Arc<dyn ImageSubmitter>,
        statuses: Arc<dyn GenerationStatusStore>,
        policy: PollPolicy,
        default_size: Option<String>,
        provider: String,
    ) -> Self {
        Self {
            ledger,
            poses,
            scripts,
            submitter,
            statuses,
            policy,
            default_size,
            provider,
        }
    }

    /// Run to a terminal task state. Failures are written to the ledger.
    pub async fn run(&self, task_id: TaskId, pose: Pose) {
        match self.execute(task_id, &pose).await {
            Ok(image_url) => {
                tracing::info!(%task_id, pose_id = pose.id, %image_url, "Pose image generated");
            }
            Err(e) => {
                tracing::warn!(%task_id, pose_id = pose.id, error = %e, "Pose image generation failed");
                record_failure(self.ledger.as_ref(), task_id, &e).await;
            }
        }
    }

    async fn execute(&self, task_id: TaskId, pose: &Pose) -> Result<String, CoreError> {
        self.ledger
            .update_status(task_id, TaskStatus::Processing, 0, MSG_GENERATING_IMAGE)
            .await?;

        let description = pose.image_prompt_source().ok_or_else(|| {
            CoreError::InvalidState(format!("pose {} has no description", pose.id))
        })?;

        let request = ImageRequest {
            drama_id: pose.drama_id,
            image_type: POSE_IMAGE_TYPE.to_string(),
            prompt: build_pose_image_prompt(description),
            size: self.resolve_size(pose.drama_id).await,
            provider: self.provider.clone(),
        };

        let generation_id = self.submitter.submit(&request).await?;
        tracing::debug!(%task_id, generation_id, size = %request.size, "Image request submitted");

        self.poll(task_id, pose.id, generation_id).await
    }

    async fn resolve_size(&self, drama_id: DbId) -> String {
        let drama_size = match self.scripts.find_drama(drama_id).await {
            Ok(drama) => drama.and_then(|d| d.default_image_size),
            Err(e) => {
                tracing::warn!(drama_id, error = %e, "Could not load drama, using global image size");
                None
            }
        };
        resolve_image_size(self.default_size.as_deref(), drama_size.as_deref())
    }

    /// Wait for the generation record to reach a terminal state.
    ///
    /// Each attempt sleeps first, then reads. Read errors are logged and
    /// count as an attempt.
    async fn poll(
        &self,
        task_id: TaskId,
        pose_id: DbId,
        generation_id: DbId,
    ) -> Result<String, CoreError> {
        for attempt in 0..self.policy.max_attempts {
            tokio::time::sleep(self.policy.delay_for(attempt)).await;

            let snapshot = match self.statuses.load(generation_id).await {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    tracing::warn!(%task_id, generation_id, attempt, error = %e, "Generation record read failed");
                    continue;
                }
            };

            if let Some(url) = snapshot.completed_url() {
                let url = url.to_string();
                if !self.poses.set_image_url(pose_id, &url).await? {
                    return Err(CoreError::not_found("Pose", pose_id));
                }
                self.ledger
                    .complete(task_id, &serde_json::json!({ "image_url": url }))
                    .await?;
                return Ok(url);
            }

            if snapshot.status == GenerationStatus::Failed {
                let message = snapshot
                    .error_message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| GENERIC_GENERATION_ERROR.to_string());
                return Err(CoreError::Upstream(message));
            }

            if let Err(e) = self
                .ledger
                .update_status(
                    task_id,
                    TaskStatus::Processing,
                    progress_for_attempt(attempt),
                    MSG_GENERATING_IMAGE,
                )
                .await
            {
                tracing::warn!(%task_id, attempt, error = %e, "Progress update failed");
            }
        }

        Err(CoreError::Timeout(timeout_message(self.policy.max_attempts)))
    }
}
