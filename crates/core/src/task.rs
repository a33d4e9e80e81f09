//! Task ledger record and lifecycle rules.
//!
//! A task is the only channel through which a background pipeline reports
//! progress. Status moves strictly forward:
//! `pending -> processing -> {completed | failed}`. Terminal tasks are
//! never mutated again.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{TaskId, Timestamp};

// ---------------------------------------------------------------------------
// Kind
// ---------------------------------------------------------------------------

/// What a task is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Extracting poses from an episode script.
    PoseExtraction,
    /// Generating an image for a single pose.
    PoseImageGeneration,
}

impl TaskKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PoseExtraction => "pose_extraction",
            Self::PoseImageGeneration => "pose_image_generation",
        }
    }
}

impl std::str::FromStr for TaskKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pose_extraction" => Ok(Self::PoseExtraction),
            "pose_image_generation" => Ok(Self::PoseImageGeneration),
            other => Err(CoreError::Validation(format!("Unknown task kind '{other}'"))),
        }
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// Statuses after which a task is frozen.
pub const TERMINAL_TASK_STATUSES: [TaskStatus; 2] = [TaskStatus::Completed, TaskStatus::Failed];

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        TERMINAL_TASK_STATUSES.contains(&self)
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(CoreError::Validation(format!(
                "Unknown task status '{other}'"
            ))),
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// Progress reported by a completed task.
pub const PROGRESS_DONE: i16 = 100;

/// A polled task record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub id: TaskId,
    pub kind: TaskKind,
    pub subject_ref: String,
    pub status: TaskStatus,
    pub progress: i16,
    pub message: Option<String>,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Task {
    /// Build a fresh pending task with a new random id.
    pub fn new(kind: TaskKind, subject_ref: impl Into<String>) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: uuid::Uuid::new_v4(),
            kind,
            subject_ref: subject_ref.into(),
            status: TaskStatus::Pending,
            progress: 0,
            message: None,
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Apply a progress update. Returns `false` and leaves the task untouched
    /// when it is already terminal.
    pub fn apply_status(&mut self, status: TaskStatus, progress: i16, message: &str) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.status = status;
        self.progress = clamp_progress(progress);
        self.message = Some(message.to_string());
        self.updated_at = chrono::Utc::now();
        true
    }

    /// Mark the task completed with `result`. No-op on terminal tasks.
    pub fn apply_result(&mut self, result: serde_json::Value) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.status = TaskStatus::Completed;
        self.progress = PROGRESS_DONE;
        self.result = Some(result);
        self.updated_at = chrono::Utc::now();
        true
    }

    /// Mark the task failed with `error`. No-op on terminal tasks.
    pub fn apply_error(&mut self, error: &str) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.status = TaskStatus::Failed;
        self.error = Some(error.to_string());
        self.updated_at = chrono::Utc::now();
        true
    }
}

/// Keep progress inside `0..=100`.
pub fn clamp_progress(progress: i16) -> i16 {
    progress.clamp(0, PROGRESS_DONE)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
