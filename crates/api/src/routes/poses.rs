//! Route definitions for poses.
//!
//! Three routers are provided:
//! - `router()` for pose routes mounted at `/poses`
//! - `drama_router()` for drama-scoped listing mounted at `/dramas`
//! - `episode_router()` for script extraction mounted at `/episodes`

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::poses;
use crate::state::AppState;

/// ```text
/// POST   /                  -> create_pose
/// PUT    /{id}              -> update_pose
/// DELETE /{id}              -> delete_pose
/// POST   /{id}/generate     -> generate_pose_image
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(poses::create_pose))
        .route("/{id}", put(poses::update_pose).delete(poses::delete_pose))
        .route("/{id}/generate", post(poses::generate_pose_image))
}

/// ```text
/// GET    /{id}/poses        -> list_by_drama
/// ```
pub fn drama_router() -> Router<AppState> {
    Router::new().route("/{id}/poses", get(poses::list_by_drama))
}

/// ```text
/// POST   /{id}/poses/extract -> extract_poses
/// ```
pub fn episode_router() -> Router<AppState> {
    Router::new().route("/{id}/poses/extract", post(poses::extract_poses))
}
