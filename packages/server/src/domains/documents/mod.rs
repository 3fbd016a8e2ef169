//! Documents domain - upload, extraction dispatch, and job status
//!
//! # Architecture
//!
//! ```text
//! POST /api/trigger-extraction -> actions::trigger_extraction -> BaseDispatcher
//!                                                                    |
//!            (in-process runner or external workflow callback) <-----+
//!                                   |
//!                 activities::extract_document -> BaseCompletion
//!                                   |
//!                             BaseResultStore <- actions::job_status <- GET /api/check-result/:id
//! ```

pub mod actions;
pub mod activities;
pub mod data;
pub mod events;
pub mod models;

use anyhow::{Context, Result};

pub use actions::{job_status, trigger_extraction, TriggerError};
pub use activities::extract_document;
pub use data::{TriggerExtractionInput, TriggerExtractionResult};
pub use events::{DocumentUploaded, DOCUMENT_UPLOADED};
pub use models::{DocumentRef, DocumentRefError, JobRecord, JobStatus};

use crate::kernel::ServerDeps;

/// Route a dispatched workflow event to its handler.
///
/// Returns `Ok(None)` for event names this domain does not handle.
pub async fn handle_event(
    name: &str,
    payload: serde_json::Value,
    deps: &ServerDeps,
) -> Result<Option<JobRecord>> {
    match name {
        DOCUMENT_UPLOADED => {
            let event: DocumentUploaded =
                serde_json::from_value(payload).context("Malformed document.uploaded payload")?;
            extract_document(&event, deps).await.map(Some)
        }
        _ => Ok(None),
    }
}
