//! Workflow service callbacks.
//!
//! When dispatch goes through the external workflow service, it delivers the
//! `document.uploaded` event back here and the extraction runs inside the request.

use axum::{extract::Extension, Json};

use crate::common::ApiError;
use crate::domains::documents::{extract_document, DocumentUploaded, JobRecord};
use crate::server::app::AxumAppState;

pub async fn document_uploaded_handler(
    Extension(state): Extension<AxumAppState>,
    Json(event): Json<DocumentUploaded>,
) -> Result<Json<JobRecord>, ApiError> {
    tracing::info!(run_id = %event.run_id, "Workflow delivered document.uploaded");

    let record = extract_document(&event, &state.server_deps).await?;
    Ok(Json(record))
}
