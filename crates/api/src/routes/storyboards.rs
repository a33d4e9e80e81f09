use axum::routing::post;
use axum::Router;

use crate::handlers::storyboards;
use crate::state::AppState;

/// Storyboard routes mounted at `/storyboards`.
///
/// ```text
/// POST   /{id}/poses        -> associate_poses
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/poses", post(storyboards::associate_poses))
}
