use axum::routing::post;
use axum::Router;

use crate::handlers::styles;
use crate::state::AppState;

/// Style routes mounted at `/styles`.
///
/// ```text
/// POST   /generate          -> generate_style
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/generate", post(styles::generate_style))
}
