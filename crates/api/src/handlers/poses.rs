//! Handlers for poses: CRUD scoped to a drama, plus the two background
//! pipelines (script extraction and image generation).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use dramagen_core::error::CoreError;
use dramagen_core::types::DbId;
use dramagen_db::models::pose::{CreatePose, UpdatePose};
use dramagen_db::repositories::{DramaRepo, PoseRepo};

use crate::error::{AppError, AppResult};
use crate::response::{DataResponse, TaskAccepted};
use crate::state::AppState;

fn ensure_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "name must not be empty".to_string(),
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// GET /api/v1/dramas/{id}/poses
pub async fn list_by_drama(
    State(state): State<AppState>,
    Path(drama_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    DramaRepo::find_by_id(&state.pool, drama_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Drama", drama_id))?;

    let poses = PoseRepo::list_by_drama(&state.pool, drama_id).await?;

    Ok(Json(DataResponse { data: poses }))
}

/// POST /api/v1/poses
///
/// Names are unique per drama; a duplicate returns 409.
pub async fn create_pose(
    State(state): State<AppState>,
    Json(input): Json<CreatePose>,
) -> AppResult<impl IntoResponse> {
    ensure_name(&input.name)?;

    let pose = PoseRepo::create(&state.pool, &input).await?;

    tracing::info!(pose_id = pose.id, drama_id = pose.drama_id, "Pose created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: pose })))
}

/// PUT /api/v1/poses/{id}
pub async fn update_pose(
    State(state): State<AppState>,
    Path(pose_id): Path<DbId>,
    Json(input): Json<UpdatePose>,
) -> AppResult<impl IntoResponse> {
    if let Some(name) = input.name.as_deref() {
        ensure_name(name)?;
    }

    let pose = PoseRepo::update(&state.pool, pose_id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Pose", pose_id))?;

    tracing::info!(pose_id, "Pose updated");

    Ok(Json(DataResponse { data: pose }))
}

/// DELETE /api/v1/poses/{id}
pub async fn delete_pose(
    State(state): State<AppState>,
    Path(pose_id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !PoseRepo::delete(&state.pool, pose_id).await? {
        return Err(CoreError::not_found("Pose", pose_id).into());
    }

    tracing::info!(pose_id, "Pose deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Background pipelines
// ---------------------------------------------------------------------------

/// POST /api/v1/episodes/{id}/poses/extract
///
/// Starts pose extraction from the episode script and returns the task id
/// to poll at `/tasks/{task_id}`.
pub async fn extract_poses(
    State(state): State<AppState>,
    Path(episode_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let task_id = state.orchestrator.extract_from_script(episode_id).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: TaskAccepted {
                task_id,
                message: "pose extraction started",
            },
        }),
    ))
}

/// POST /api/v1/poses/{id}/generate
///
/// 409 when the pose has no description to use as a prompt.
pub async fn generate_pose_image(
    State(state): State<AppState>,
    Path(pose_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let task_id = state.orchestrator.generate_image(pose_id).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: TaskAccepted {
                task_id,
                message: "pose image generation started",
            },
        }),
    ))
}
