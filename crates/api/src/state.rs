use std::sync::Arc;

use dramagen_pipeline::PoseOrchestrator;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything inside is behind `Arc` or already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: dramagen_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Entry point for pose extraction, pose images and style generation.
    pub orchestrator: Arc<PoseOrchestrator>,
}
