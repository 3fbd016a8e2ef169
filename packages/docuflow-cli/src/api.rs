//! HTTP client for the DocuFlow API
//!
//! Two calls: trigger an extraction, then read the run's status until it settles.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Failure reported for a `failed` record that carries no reason
pub const DEFAULT_FAILURE_REASON: &str = "Job failed without specific error message";

#[derive(Debug, Error)]
pub enum ClientError {
    /// Non-2xx response; `message` is the body's `error` text when present
    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

/// Body of `POST /api/trigger-extraction`
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerRequest {
    pub document_data_uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TriggerResponse {
    run_id: String,
}

/// Body of `GET /api/check-result/:run_id`.
///
/// `status` stays a string: values this client does not know are treated as
/// still running.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunState {
    Running,
    Completed(Value),
    Failed(String),
}

impl StatusResponse {
    pub fn pending() -> Self {
        Self {
            status: "pending".to_string(),
            data: None,
            error: None,
        }
    }

    pub fn completed(data: Value) -> Self {
        Self {
            status: "completed".to_string(),
            data: Some(data),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: "failed".to_string(),
            data: None,
            error: Some(error.into()),
        }
    }

    pub fn state(&self) -> RunState {
        match self.status.as_str() {
            "completed" => RunState::Completed(self.data.clone().unwrap_or(Value::Null)),
            "failed" => RunState::Failed(
                self.error
                    .clone()
                    .filter(|e| !e.is_empty())
                    .unwrap_or_else(|| DEFAULT_FAILURE_REASON.to_string()),
            ),
            _ => RunState::Running,
        }
    }
}

#[async_trait]
pub trait DocuflowApi: Send + Sync {
    /// Start an extraction; returns the run id
    async fn trigger(&self, request: &TriggerRequest) -> Result<String, ClientError>;

    async fn status(&self, run_id: &str) -> Result<StatusResponse, ClientError>;
}

/// `DocuflowApi` over HTTP
#[derive(Clone)]
pub struct HttpDocuflowApi {
    base_url: String,
    http_client: reqwest::Client,
}

impl HttpDocuflowApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl DocuflowApi for HttpDocuflowApi {
    async fn trigger(&self, request: &TriggerRequest) -> Result<String, ClientError> {
        let url = format!("{}/api/trigger-extraction", self.base_url);
        tracing::debug!(url = %url, "Triggering extraction");

        let response = self.http_client.post(&url).json(request).send().await?;
        let body: TriggerResponse = read_json(response).await?;
        Ok(body.run_id)
    }

    async fn status(&self, run_id: &str) -> Result<StatusResponse, ClientError> {
        let url = format!("{}/api/check-result/{}", self.base_url, run_id);

        let response = self.http_client.get(&url).send().await?;
        read_json(response).await
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        return Err(ClientError::Http {
            status: status.as_u16(),
            message: error_message(status, &text),
        });
    }

    serde_json::from_str(&text).map_err(|e| ClientError::Decode(e.to_string()))
}

/// Prefer the `{ "error": ... }` envelope, then the raw body, then the status line.
fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: String,
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.error;
    }

    let body = body.trim();
    if body.is_empty() {
        status.to_string()
    } else {
        body.to_string()
    }
}
