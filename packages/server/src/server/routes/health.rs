use axum::{extract::Extension, Json};
use serde::Serialize;

use crate::common::ApiError;
use crate::server::app::AxumAppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    jobs_tracked: usize,
}

/// Health check endpoint
///
/// Returns 200 OK with the number of runs currently held in the result store.
pub async fn health_handler(
    Extension(state): Extension<AxumAppState>,
) -> Result<Json<HealthResponse>, ApiError> {
    let jobs_tracked = state.server_deps.result_store.len().await?;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        jobs_tracked,
    }))
}
