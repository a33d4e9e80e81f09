//! Task ledger row model.

use serde::Serialize;
use sqlx::FromRow;
use dramagen_core::error::CoreError;
use dramagen_core::task::{Task, TaskStatus};
use dramagen_core::types::{TaskId, Timestamp};

use super::status::{StatusId, TaskStatusId};

/// A row from the `tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TaskRow {
    pub id: TaskId,
    pub kind: String,
    pub subject_ref: String,
    pub status_id: StatusId,
    pub progress: i16,
    pub message: Option<String>,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<TaskRow> for Task {
    type Error = CoreError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let status = TaskStatusId::from_id(row.status_id)
            .map(TaskStatus::from)
            .ok_or_else(|| {
                CoreError::Internal(format!("Unknown task status id {}", row.status_id))
            })?;

        Ok(Task {
            id: row.id,
            kind: row.kind.parse()?,
            subject_ref: row.subject_ref,
            status,
            progress: row.progress,
            message: row.message,
            result: row.result,
            error: row.error,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
