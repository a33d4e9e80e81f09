//! Entry point for triggering pose pipelines.

use std::sync::Arc;

use dramagen_core::error::CoreError;
use dramagen_core::providers::{GenerationStatusStore, ImageSubmitter, TextGenerator};
use dramagen_core::stores::{PoseStore, ScriptSource, TaskLedger};
use dramagen_core::task::{Task, TaskKind};
use dramagen_core::types::{DbId, TaskId};

use crate::config::PipelineConfig;
use crate::extraction::ExtractionPipeline;
use crate::image::ImagePipeline;
use crate::runner::TaskRunner;
use crate::style::generate_style;

/// Everything the pipelines read from or write to.
#[derive(Clone)]
pub struct Collaborators {
    pub ledger: Arc<dyn TaskLedger>,
    pub poses: Arc<dyn PoseStore>,
    pub scripts: Arc<dyn ScriptSource>,
    pub text: Arc<dyn TextGenerator>,
    pub image_submitter: Arc<dyn ImageSubmitter>,
    pub image_statuses: Arc<dyn GenerationStatusStore>,
}

/// Validates triggers, creates tasks and hands the work to the runner.
///
/// Precondition failures are returned directly and never create a task.
pub struct PoseOrchestrator {
    ledger: Arc<dyn TaskLedger>,
    poses: Arc<dyn PoseStore>,
    scripts: Arc<dyn ScriptSource>,
    text: Arc<dyn TextGenerator>,
    extraction: Arc<ExtractionPipeline>,
    image: Arc<ImagePipeline>,
    runner: TaskRunner,
}

impl PoseOrchestrator {
    pub fn new(deps: Collaborators, config: &PipelineConfig, runner: TaskRunner) -> Self {
        let extraction = ExtractionPipeline::new(
            Arc::clone(&deps.ledger),
            Arc::clone(&deps.poses),
            Arc::clone(&deps.scripts),
            Arc::clone(&deps.text),
            config.extraction_max_tokens,
        );
        let image = ImagePipeline::new(
            Arc::clone(&deps.ledger),
            Arc::clone(&deps.poses),
            Arc::clone(&deps.scripts),
            deps.image_submitter,
            deps.image_statuses,
            config.poll,
            config.default_image_size.clone(),
            config.default_image_provider.clone(),
        );

        Self {
            ledger: deps.ledger,
            poses: deps.poses,
            scripts: deps.scripts,
            text: deps.text,
            extraction: Arc::new(extraction),
            image: Arc::new(image),
            runner,
        }
    }

    /// Start extracting poses from an episode's script.
    ///
    /// Returns as soon as the task exists; the AI call happens in the
    /// background.
    pub async fn extract_from_script(&self, episode_id: DbId) -> Result<TaskId, CoreError> {
        let episode = self
            .scripts
            .find_episode(episode_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Episode", episode_id))?;

        let task = self
            .ledger
            .create(TaskKind::PoseExtraction, &episode_id.to_string())
            .await?;
        tracing::info!(task_id = %task.id, episode_id, "Pose extraction queued");

        let pipeline = Arc::clone(&self.extraction);
        let task_id = task.id;
        self.runner.spawn(task_id, task.kind, async move {
            pipeline.run(task_id, episode).await;
        });

        Ok(task_id)
    }

    /// Start generating an image for a pose.
    ///
    /// Fails with `InvalidState` when the pose has no description to use as
    /// a prompt.
    pub async fn generate_image(&self, pose_id: DbId) -> Result<TaskId, CoreError> {
        let pose = self
            .poses
            .find(pose_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Pose", pose_id))?;

        if pose.image_prompt_source().is_none() {
            return Err(CoreError::InvalidState(format!(
                "pose {pose_id} has no description to generate an image from"
            )));
        }

        let task = self
            .ledger
            .create(TaskKind::PoseImageGeneration, &pose_id.to_string())
            .await?;
        tracing::info!(task_id = %task.id, pose_id, "Pose image generation queued");

        let pipeline = Arc::clone(&self.image);
        let task_id = task.id;
        self.runner.spawn(task_id, task.kind, async move {
            pipeline.run(task_id, pose).await;
        });

        Ok(task_id)
    }

    pub async fn get_task(&self, task_id: TaskId) -> Result<Task, CoreError> {
        self.ledger
            .get(task_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Task", task_id))
    }

    /// Generate a visual style configuration. Runs inline, no task.
    pub async fn generate_style(&self, description: &str) -> Result<serde_json::Value, CoreError> {
        generate_style(self.text.as_ref(), description).await
    }

    pub fn runner(&self) -> &TaskRunner {
        &self.runner
    }
}
