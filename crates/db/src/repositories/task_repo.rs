//! Repository for the `tasks` table.
//!
//! Every mutator is a single guarded UPDATE: rows already in a terminal
//! status are never touched, so a late writer cannot resurrect a task.

use sqlx::PgPool;
use dramagen_core::task::{TaskKind, TaskStatus, PROGRESS_DONE};
use dramagen_core::types::TaskId;

use crate::models::status::{StatusId, TaskStatusId, TERMINAL_TASK_STATUS_IDS};
use crate::models::task::TaskRow;

/// Column list for `tasks` queries.
const COLUMNS: &str = "\
    id, kind, subject_ref, status_id, progress, message, result, error, \
    created_at, updated_at";

/// Provides ledger operations for background tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// Insert a new pending task at progress 0.
    pub async fn create(
        pool: &PgPool,
        kind: TaskKind,
        subject_ref: &str,
    ) -> Result<TaskRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks (id, kind, subject_ref, status_id, progress) \
             VALUES ($1, $2, $3, $4, 0) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TaskRow>(&query)
            .bind(uuid::Uuid::new_v4())
            .bind(kind.as_str())
            .bind(subject_ref)
            .bind(TaskStatusId::Pending.id())
            .fetch_one(pool)
            .await
    }

    /// Find a task by id.
    pub async fn find_by_id(pool: &PgPool, id: TaskId) -> Result<Option<TaskRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1");
        sqlx::query_as::<_, TaskRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Set status, progress and message on a non-terminal task.
    ///
    /// Returns `false` when the task is terminal or does not exist.
    pub async fn update_status(
        pool: &PgPool,
        id: TaskId,
        status: TaskStatus,
        progress: i16,
        message: &str,
    ) -> Result<bool, sqlx::Error> {
        let status_id: StatusId = TaskStatusId::from(status).into();
        let result = sqlx::query(
            "UPDATE tasks \
             SET status_id = $2, progress = LEAST(GREATEST($3, 0), 100), message = $4 \
             WHERE id = $1 AND status_id NOT IN ($5, $6)",
        )
        .bind(id)
        .bind(status_id)
        .bind(progress)
        .bind(message)
        .bind(TERMINAL_TASK_STATUS_IDS[0])
        .bind(TERMINAL_TASK_STATUS_IDS[1])
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark a task completed with its result payload and progress 100.
    pub async fn complete(
        pool: &PgPool,
        id: TaskId,
        result: &serde_json::Value,
    ) -> Result<bool, sqlx::Error> {
        let outcome = sqlx::query(
            "UPDATE tasks \
             SET status_id = $2, result = $3, progress = $4 \
             WHERE id = $1 AND status_id NOT IN ($5, $6)",
        )
        .bind(id)
        .bind(TaskStatusId::Completed.id())
        .bind(result)
        .bind(PROGRESS_DONE)
        .bind(TERMINAL_TASK_STATUS_IDS[0])
        .bind(TERMINAL_TASK_STATUS_IDS[1])
        .execute(pool)
        .await?;
        Ok(outcome.rows_affected() > 0)
    }

    /// Mark a task failed with an error message. Progress is left as is.
    pub async fn fail(pool: &PgPool, id: TaskId, error: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE tasks \
             SET status_id = $2, error = $3 \
             WHERE id = $1 AND status_id NOT IN ($4, $5)",
        )
        .bind(id)
        .bind(TaskStatusId::Failed.id())
        .bind(error)
        .bind(TERMINAL_TASK_STATUS_IDS[0])
        .bind(TERMINAL_TASK_STATUS_IDS[1])
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
