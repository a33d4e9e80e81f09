//! Script-to-poses extraction pipeline.

use std::sync::Arc;

use dramagen_core::ai_json::parse_ai_json;
use dramagen_core::entities::{Episode, Pose};
use dramagen_core::error::CoreError;
use dramagen_core::pose_extraction::{
    build_extraction_prompt, ExtractedPose, ExtractionSummary, PromptStyle, MSG_ANALYZING_SCRIPT,
    MSG_SAVING_POSES, PROGRESS_SAVING,
};
use dramagen_core::providers::{GenerateOptions, TextGenerator};
use dramagen_core::stores::{PoseStore, ScriptSource, TaskLedger};
use dramagen_core::task::TaskStatus;
use dramagen_core::types::{DbId, TaskId};

use crate::record_failure;

/// Turns an episode script into persisted poses, reporting through the ledger.
pub struct ExtractionPipeline {
    ledger: Arc<dyn TaskLedger>,
    poses: Arc<dyn PoseStore>,
    scripts: Arc<dyn ScriptSource>,
    text: Arc<dyn TextGenerator>,
    max_tokens: u32,
}

impl ExtractionPipeline {
    pub fn new(
        ledger: Arc<dyn TaskLedger>,
        poses: Arc<dyn PoseStore>,
        scripts: Arc<dyn ScriptSource>,
        text: Arc<dyn TextGenerator>,
        max_tokens: u32,
    ) -> Self {
        Self {
            ledger,
            poses,
            scripts,
            text,
            max_tokens,
        }
    }

    /// Run to a terminal task state. Never returns an error; failures are
    /// written to the ledger.
    pub async fn run(&self, task_id: TaskId, episode: Episode) {
        match self.execute(task_id, &episode).await {
            Ok(summary) => {
                tracing::info!(
                    %task_id,
                    episode_id = episode.id,
                    candidates = summary.candidates,
                    created = summary.created,
                    duplicates = summary.duplicates,
                    failed = summary.failed,
                    "Pose extraction completed",
                );
            }
            Err(e) => {
                if let CoreError::Parse { raw, .. } = &e {
                    tracing::warn!(%task_id, error = %e, %raw, "AI output could not be parsed");
                } else {
                    tracing::warn!(%task_id, error = %e, "Pose extraction failed");
                }
                record_failure(self.ledger.as_ref(), task_id, &e).await;
            }
        }
    }

    async fn execute(
        &self,
        task_id: TaskId,
        episode: &Episode,
    ) -> Result<ExtractionSummary, CoreError> {
        self.ledger
            .update_status(task_id, TaskStatus::Processing, 0, MSG_ANALYZING_SCRIPT)
            .await?;

        let style = self.resolve_style(episode.drama_id).await;
        let prompt =
            build_extraction_prompt(episode.script_content.as_deref().unwrap_or(""), &style);
        let options = GenerateOptions::default().with_max_tokens(self.max_tokens);

        let raw = self.text.generate(&prompt, None, &options).await?;
        let candidates: Vec<ExtractedPose> = parse_ai_json(&raw)?;

        self.ledger
            .update_status(task_id, TaskStatus::Processing, PROGRESS_SAVING, MSG_SAVING_POSES)
            .await?;

        let (created, summary) = self.save_candidates(episode.drama_id, &candidates).await;

        self.ledger
            .update_status(
                task_id,
                TaskStatus::Processing,
                PROGRESS_SAVING,
                &summary.message(),
            )
            .await?;

        let result = serde_json::to_value(&created)
            .map_err(|e| CoreError::Internal(format!("Failed to serialize poses: {e}")))?;
        self.ledger.complete(task_id, &result).await?;

        Ok(summary)
    }

    /// Drama-level prompt hints. A missing or unreadable drama means no hints.
    async fn resolve_style(&self, drama_id: DbId) -> PromptStyle {
        match self.scripts.find_drama(drama_id).await {
            Ok(Some(drama)) => PromptStyle::from_drama(&drama),
            Ok(None) => PromptStyle::default(),
            Err(e) => {
                tracing::warn!(drama_id, error = %e, "Could not load drama, using default prompt");
                PromptStyle::default()
            }
        }
    }

    /// Persist candidates in order. First write wins per name; per-candidate
    /// errors are counted and skipped.
    async fn save_candidates(
        &self,
        drama_id: DbId,
        candidates: &[ExtractedPose],
    ) -> (Vec<Pose>, ExtractionSummary) {
        let mut created = Vec::with_capacity(candidates.len());
        let mut summary = ExtractionSummary {
            candidates: candidates.len(),
            ..Default::default()
        };

        for candidate in candidates {
            let input = candidate.to_new_pose(drama_id);
            if input.name.is_empty() {
                tracing::warn!(drama_id, "Skipping extracted pose without a name");
                summary.failed += 1;
                continue;
            }

            match self.poses.exists_by_name(drama_id, &input.name).await {
                Ok(true) => {
                    summary.duplicates += 1;
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(drama_id, name = %input.name, error = %e, "Pose lookup failed");
                    summary.failed += 1;
                    continue;
                }
            }

            match self.poses.create(&input).await {
                Ok(pose) => {
                    summary.created += 1;
                    created.push(pose);
                }
                Err(CoreError::Conflict(_)) => {
                    tracing::debug!(drama_id, name = %input.name, "Pose created concurrently, skipping");
                    summary.duplicates += 1;
                }
                Err(e) => {
                    tracing::warn!(drama_id, name = %input.name, error = %e, "Failed to save pose");
                    summary.failed += 1;
                }
            }
        }

        (created, summary)
    }
}
