//! Task polling.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use dramagen_core::types::TaskId;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/tasks/{id}
pub async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<TaskId>,
) -> AppResult<impl IntoResponse> {
    let task = state.orchestrator.get_task(task_id).await?;

    Ok(Json(DataResponse { data: task }))
}
