use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use dramagen_core::error::CoreError;
use dramagen_core::types::DbId;
use dramagen_db::models::storyboard::AssociatePoses;
use dramagen_db::repositories::StoryboardRepo;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/storyboards/{id}/poses
///
/// Replace the storyboard's pose set with `pose_ids`. Ids that match no pose
/// are dropped. Returns the resulting pose ids.
pub async fn associate_poses(
    State(state): State<AppState>,
    Path(storyboard_id): Path<DbId>,
    Json(input): Json<AssociatePoses>,
) -> AppResult<impl IntoResponse> {
    StoryboardRepo::find_by_id(&state.pool, storyboard_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Storyboard", storyboard_id))?;

    StoryboardRepo::replace_poses(&state.pool, storyboard_id, &input.pose_ids).await?;
    let pose_ids = StoryboardRepo::list_pose_ids(&state.pool, storyboard_id).await?;

    tracing::info!(storyboard_id, count = pose_ids.len(), "Storyboard poses replaced");

    Ok(Json(DataResponse { data: pose_ids }))
}
