pub mod health;
pub mod poses;
pub mod storyboards;
pub mod styles;
pub mod tasks;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /dramas/{id}/poses                   list poses of a drama
/// /episodes/{id}/poses/extract         start pose extraction (POST)
///
/// /poses                               create
/// /poses/{id}                          update, delete
/// /poses/{id}/generate                 start image generation (POST)
///
/// /tasks/{id}                          poll a background task
///
/// /storyboards/{id}/poses              replace pose association (POST)
///
/// /styles/generate                     generate a style config (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/dramas", poses::drama_router())
        .nest("/episodes", poses::episode_router())
        .nest("/poses", poses::router())
        .nest("/tasks", tasks::router())
        .nest("/storyboards", storyboards::router())
        .nest("/styles", styles::router())
}
