use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateStyleRequest {
    pub description: String,
}

/// POST /api/v1/styles/generate
///
/// Runs inline: the response carries the generated style object.
pub async fn generate_style(
    State(state): State<AppState>,
    Json(input): Json<GenerateStyleRequest>,
) -> AppResult<impl IntoResponse> {
    let style = state.orchestrator.generate_style(&input.description).await?;

    Ok(Json(DataResponse { data: style }))
}
