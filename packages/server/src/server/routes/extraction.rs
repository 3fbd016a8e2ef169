//! Extraction trigger and result polling endpoints.
//!
//! POST /api/trigger-extraction   -> `{ "runId": "..." }`
//! GET  /api/check-result/:run_id -> job record

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    Json,
};

use crate::common::ApiError;
use crate::domains::documents::{
    job_status, trigger_extraction, JobRecord, TriggerExtractionInput, TriggerExtractionResult,
};
use crate::server::app::AxumAppState;

/// Accept a document and dispatch its extraction.
///
/// Malformed bodies are reported with the same `{ "error": ... }` envelope as
/// validation failures.
pub async fn trigger_extraction_handler(
    Extension(state): Extension<AxumAppState>,
    body: Result<Json<TriggerExtractionInput>, JsonRejection>,
) -> Result<Json<TriggerExtractionResult>, ApiError> {
    let Json(input) = body.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;

    let result = trigger_extraction(input, &state.server_deps).await?;
    Ok(Json(result))
}

/// Report the status of a run. Terminal records are returned unchanged on every read.
pub async fn check_result_handler(
    Extension(state): Extension<AxumAppState>,
    Path(run_id): Path<String>,
) -> Result<Json<JobRecord>, ApiError> {
    job_status(&run_id, &state.server_deps)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Job not found".to_string()))
}
