//! Documents domain actions - business logic behind the HTTP endpoints

use anyhow::Context;
use thiserror::Error;
use tracing::{info, warn};

use crate::common::new_run_id;
use crate::domains::documents::data::{
    TriggerExtractionInput, TriggerExtractionResult, DEFAULT_DESCRIPTION, DEFAULT_FILE_NAME,
};
use crate::domains::documents::events::{DocumentUploaded, DOCUMENT_UPLOADED};
use crate::domains::documents::models::{DocumentRef, DocumentRefError, JobRecord};
use crate::kernel::ServerDeps;

#[derive(Debug, Error)]
pub enum TriggerError {
    #[error(transparent)]
    InvalidDocument(#[from] DocumentRefError),

    /// The workflow dispatcher failed; carries its message
    #[error("{0}")]
    Dispatch(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Validate the request, register the run as pending, and hand it to the dispatcher.
///
/// Returns as soon as the dispatcher accepts the event; the extraction itself runs
/// in the worker.
pub async fn trigger_extraction(
    input: TriggerExtractionInput,
    deps: &ServerDeps,
) -> Result<TriggerExtractionResult, TriggerError> {
    let reference = input.document_data_uri.trim();
    let document = DocumentRef::parse(reference)?;
    let media_type = document.media_type(input.content_type.as_deref())?;

    let run_id = new_run_id();
    let event = DocumentUploaded {
        run_id: run_id.clone(),
        document_data_uri: reference.to_string(),
        content_type: input.content_type.filter(|ct| !ct.trim().is_empty()),
        description: non_blank(input.description).unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
        file_name: non_blank(input.file_name).unwrap_or_else(|| DEFAULT_FILE_NAME.to_string()),
        fields: input.fields.filter(|fields| !fields.is_empty()),
    };

    deps.result_store
        .set_if_absent(&run_id, JobRecord::Pending)
        .await
        .context("Failed to register run")?;

    let payload = serde_json::to_value(&event).context("Failed to encode document event")?;

    match deps.dispatcher.send(DOCUMENT_UPLOADED, payload).await {
        Ok(dispatch_id) => {
            info!(
                run_id = %run_id,
                dispatch_id = %dispatch_id,
                media_type = %media_type,
                file_name = %event.file_name,
                "Extraction dispatched"
            );
            Ok(TriggerExtractionResult { run_id })
        }
        Err(e) => {
            let message = format!("{:#}", e);
            warn!(run_id = %run_id, error = %message, "Extraction dispatch failed");
            deps.result_store
                .settle(&run_id, JobRecord::failed(message.clone()))
                .await
                .context("Failed to record dispatch failure")?;
            Err(TriggerError::Dispatch(message))
        }
    }
}

/// Current record for `run_id`, `None` when the id was never dispatched.
pub async fn job_status(run_id: &str, deps: &ServerDeps) -> anyhow::Result<Option<JobRecord>> {
    deps.result_store
        .get(run_id)
        .await
        .context("Failed to read result store")
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
