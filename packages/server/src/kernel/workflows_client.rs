//! Workflow event client
//!
//! Simple HTTP client for sending events to an external event-driven workflow service.
//! The service runs the matching workflow later and calls back into
//! `POST /api/workflows/document-uploaded`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::kernel::BaseDispatcher;

/// Client for sending events to the workflow service via HTTP
#[derive(Clone)]
pub struct WorkflowEventClient {
    base_url: String,
    event_key: String,
    http_client: Arc<reqwest::Client>,
}

#[derive(Serialize)]
struct EventEnvelope<'a, T: Serialize> {
    name: &'a str,
    data: T,
}

#[derive(Debug, Deserialize)]
struct SendEventResponse {
    #[serde(default)]
    ids: Vec<String>,
}

impl WorkflowEventClient {
    /// Create a new workflow event client
    pub fn new(base_url: impl Into<String>, event_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            event_key: event_key.into(),
            http_client: Arc::new(reqwest::Client::new()),
        }
    }

    fn event_url(&self) -> String {
        format!("{}/e/{}", self.base_url, self.event_key)
    }

    /// Send an event without waiting for the triggered workflow (fire-and-forget).
    ///
    /// Returns the event ids assigned by the service.
    pub async fn send_event<T>(&self, name: &str, data: T) -> Result<Vec<String>>
    where
        T: Serialize,
    {
        let url = self.event_url();

        tracing::debug!(event = name, url = %url, "Sending workflow event");

        let response = self
            .http_client
            .post(&url)
            .json(&EventEnvelope { name, data })
            .send()
            .await
            .context("Failed to send workflow event")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            anyhow::bail!("Workflow event rejected ({}): {}", status, body);
        }

        let body: SendEventResponse = response
            .json()
            .await
            .context("Failed to deserialize workflow event response")?;

        Ok(body.ids)
    }
}

#[async_trait]
impl BaseDispatcher for WorkflowEventClient {
    async fn send(&self, event_name: &str, payload: serde_json::Value) -> Result<String> {
        self.send_event(event_name, payload)
            .await?
            .into_iter()
            .next()
            .context("Workflow service returned no event id")
    }
}
