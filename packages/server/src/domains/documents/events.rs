//! Documents domain events
//!
//! Events handed to the workflow dispatcher. The worker consumes them either from
//! the in-process runner or from the external workflow service's callback.

use serde::{Deserialize, Serialize};

/// Event name for a newly uploaded document.
pub const DOCUMENT_UPLOADED: &str = "document.uploaded";

/// Payload of the `document.uploaded` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentUploaded {
    pub run_id: String,
    pub document_data_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    pub description: String,
    pub file_name: String,
    /// Fields the caller wants; `None` lets the model choose.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
}
