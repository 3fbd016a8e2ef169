//! Request and response bodies of the documents endpoints.

use serde::{Deserialize, Serialize};

/// Description used when the caller sends none.
pub const DEFAULT_DESCRIPTION: &str = "Extract all relevant data from this document";

/// Display name used when the caller sends none.
pub const DEFAULT_FILE_NAME: &str = "Unknown Document";

/// Body of `POST /api/trigger-extraction`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerExtractionInput {
    #[serde(default)]
    pub document_data_uri: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub fields: Option<Vec<String>>,
}

/// Body returned by `POST /api/trigger-extraction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerExtractionResult {
    pub run_id: String,
}
