//! Scripted collaborators and helpers shared by the pipeline tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use dramagen_core::entities::{Drama, Episode, NewPose, Pose};
use dramagen_core::error::CoreError;
use dramagen_core::image_generation::{GenerationSnapshot, GenerationStatus, ImageRequest};
use dramagen_core::providers::{
    GenerateOptions, GenerationStatusStore, ImageSubmitter, TextGenerator,
};
use dramagen_core::stores::{PoseStore, TaskLedger};
use dramagen_core::task::Task;
use dramagen_core::types::{DbId, TaskId};
use dramagen_pipeline::memory::{MemoryPoseStore, MemoryScriptSource, MemoryTaskLedger};
use dramagen_pipeline::{Collaborators, PipelineConfig, PoseOrchestrator, TaskRunner};
use tokio::sync::Semaphore;

pub const DRAMA_ID: DbId = 1;
pub const EPISODE_ID: DbId = 10;

// ---------------------------------------------------------------------------
// Text generator
// ---------------------------------------------------------------------------

/// Returns queued replies in order and records every prompt.
#[derive(Default)]
pub struct ScriptedText {
    replies: Mutex<VecDeque<Result<String, CoreError>>>,
    prompts: Mutex<Vec<(String, Option<String>, GenerateOptions)>>,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedText {
    pub fn replying(replies: impl IntoIterator<Item = Result<String, CoreError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            ..Default::default()
        }
    }

    /// Block each call until the returned semaphore gets a permit.
    pub fn gated(mut self) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        self.gate = Some(Arc::clone(&gate));
        (self, gate)
    }

    pub fn prompts(&self) -> Vec<(String, Option<String>, GenerateOptions)> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedText {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        options: &GenerateOptions,
    ) -> Result<String, CoreError> {
        self.prompts.lock().unwrap().push((
            prompt.to_string(),
            system_prompt.map(String::from),
            options.clone(),
        ));
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(CoreError::Upstream("no scripted reply".into())))
    }
}

// ---------------------------------------------------------------------------
// Image queue
// ---------------------------------------------------------------------------

/// What one `load` call returns.
#[derive(Clone)]
pub enum Poll {
    Status(GenerationStatus),
    Completed(&'static str),
    Failed(Option<&'static str>),
    ReadError,
}

/// Records submissions and replays a poll script; the last entry repeats.
pub struct ScriptedImages {
    submit_error: Option<String>,
    script: Mutex<VecDeque<Poll>>,
    last: Mutex<Poll>,
    pub requests: Mutex<Vec<ImageRequest>>,
    loads: AtomicUsize,
}

impl ScriptedImages {
    pub fn polling(script: impl IntoIterator<Item = Poll>) -> Self {
        Self {
            submit_error: None,
            script: Mutex::new(script.into_iter().collect()),
            last: Mutex::new(Poll::Status(GenerationStatus::Processing)),
            requests: Mutex::new(Vec::new()),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn rejecting(message: &str) -> Self {
        Self {
            submit_error: Some(message.to_string()),
            ..Self::polling([])
        }
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<ImageRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ImageSubmitter for ScriptedImages {
    async fn submit(&self, request: &ImageRequest) -> Result<DbId, CoreError> {
        if let Some(message) = &self.submit_error {
            return Err(CoreError::Upstream(message.clone()));
        }
        let mut requests = self.requests.lock().unwrap();
        requests.push(request.clone());
        Ok(requests.len() as DbId)
    }
}

#[async_trait]
impl GenerationStatusStore for ScriptedImages {
    async fn load(&self, generation_id: DbId) -> Result<GenerationSnapshot, CoreError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let step = {
            let mut script = self.script.lock().unwrap();
            let mut last = self.last.lock().unwrap();
            if let Some(next) = script.pop_front() {
                *last = next;
            }
            last.clone()
        };

        let snapshot = |status: GenerationStatus, image_url: Option<&str>, error: Option<&str>| {
            GenerationSnapshot {
                id: generation_id,
                status,
                image_url: image_url.map(String::from),
                error_message: error.map(String::from),
            }
        };

        match step {
            Poll::Status(status) => Ok(snapshot(status, None, None)),
            Poll::Completed(url) => Ok(snapshot(GenerationStatus::Completed, Some(url), None)),
            Poll::Failed(error) => Ok(snapshot(GenerationStatus::Failed, None, error)),
            Poll::ReadError => Err(CoreError::Internal("connection reset".into())),
        }
    }
}

// ---------------------------------------------------------------------------
// Pose store wrapper
// ---------------------------------------------------------------------------

/// Delegates to a memory store but fails creation of the named poses and
/// optionally every `set_image_url`.
pub struct FlakyPoses {
    pub inner: MemoryPoseStore,
    pub fail_create: Vec<&'static str>,
    pub fail_set_url: bool,
}

#[async_trait]
impl PoseStore for FlakyPoses {
    async fn find(&self, id: DbId) -> Result<Option<Pose>, CoreError> {
        self.inner.find(id).await
    }

    async fn exists_by_name(&self, drama_id: DbId, name: &str) -> Result<bool, CoreError> {
        self.inner.exists_by_name(drama_id, name).await
    }

    async fn create(&self, input: &NewPose) -> Result<Pose, CoreError> {
        if self.fail_create.contains(&input.name.as_str()) {
            return Err(CoreError::Internal("disk full".into()));
        }
        self.inner.create(input).await
    }

    async fn set_image_url(&self, id: DbId, image_url: &str) -> Result<bool, CoreError> {
        if self.fail_set_url {
            return Err(CoreError::Internal("disk full".into()));
        }
        self.inner.set_image_url(id, image_url).await
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub struct Harness {
    pub ledger: Arc<MemoryTaskLedger>,
    pub poses: Arc<dyn PoseStore>,
    pub scripts: Arc<MemoryScriptSource>,
    pub text: Arc<ScriptedText>,
    pub images: Arc<ScriptedImages>,
    pub orchestrator: PoseOrchestrator,
}

pub struct HarnessBuilder {
    poses: Arc<dyn PoseStore>,
    text: ScriptedText,
    images: ScriptedImages,
    config: PipelineConfig,
    drama: Option<Drama>,
    script: Option<String>,
}

impl HarnessBuilder {
    pub fn new() -> Self {
        Self {
            poses: Arc::new(MemoryPoseStore::new()),
            text: ScriptedText::default(),
            images: ScriptedImages::polling([]),
            config: PipelineConfig::default(),
            drama: Some(Drama {
                id: DRAMA_ID,
                ..Default::default()
            }),
            script: Some("Alice raises her hand.".to_string()),
        }
    }

    pub fn poses(mut self, poses: Arc<dyn PoseStore>) -> Self {
        self.poses = poses;
        self
    }

    pub fn text(mut self, text: ScriptedText) -> Self {
        self.text = text;
        self
    }

    pub fn images(mut self, images: ScriptedImages) -> Self {
        self.images = images;
        self
    }

    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn drama(mut self, drama: Option<Drama>) -> Self {
        self.drama = drama;
        self
    }

    pub async fn build(self) -> Harness {
        let ledger = Arc::new(MemoryTaskLedger::new());
        let scripts = Arc::new(MemoryScriptSource::new());
        scripts
            .insert_episode(Episode {
                id: EPISODE_ID,
                drama_id: DRAMA_ID,
                script_content: self.script,
            })
            .await;
        if let Some(drama) = self.drama {
            scripts.insert_drama(drama).await;
        }
        let text = Arc::new(self.text);
        let images = Arc::new(self.images);

        let deps = Collaborators {
            ledger: ledger.clone(),
            poses: self.poses.clone(),
            scripts: scripts.clone(),
            text: text.clone(),
            image_submitter: images.clone(),
            image_statuses: images.clone(),
        };
        let runner = TaskRunner::new(self.config.max_concurrent_tasks);
        let orchestrator = PoseOrchestrator::new(deps, &self.config, runner);

        Harness {
            ledger,
            poses: self.poses,
            scripts,
            text,
            images,
            orchestrator,
        }
    }
}

/// Poll the ledger until the task is terminal. Intended for paused-clock
/// tests, where each sleep auto-advances virtual time.
pub async fn wait_terminal(ledger: &dyn TaskLedger, task_id: TaskId) -> Task {
    for _ in 0..100_000 {
        let task = ledger.get(task_id).await.unwrap().expect("task exists");
        if task.is_terminal() {
            return task;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    panic!("task {task_id} never reached a terminal state");
}

pub fn pose_json(entries: &[(&str, &str, &str, &str)]) -> String {
    let items: Vec<serde_json::Value> = entries
        .iter()
        .map(|(name, kind, description, image_prompt)| {
            serde_json::json!({
                "name": name,
                "type": kind,
                "description": description,
                "image_prompt": image_prompt,
            })
        })
        .collect();
    serde_json::Value::Array(items).to_string()
}
