//! In-process workflow dispatcher.
//!
//! Stands in for the external workflow service when none is configured: events go
//! over a bounded channel to the `ExtractionRunner` running in the same process.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::kernel::BaseDispatcher;

/// An event accepted by the dispatcher and waiting for the runner.
#[derive(Debug, Clone)]
pub struct DispatchedEvent {
    pub id: String,
    pub name: String,
    pub payload: serde_json::Value,
}

/// `BaseDispatcher` backed by a tokio mpsc channel.
#[derive(Clone)]
pub struct InProcessDispatcher {
    tx: mpsc::Sender<DispatchedEvent>,
}

impl InProcessDispatcher {
    /// Create the dispatcher and the receiving end for the runner.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<DispatchedEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

#[async_trait]
impl BaseDispatcher for InProcessDispatcher {
    async fn send(&self, event_name: &str, payload: serde_json::Value) -> Result<String> {
        let id = format!("evt_{}", Uuid::new_v4().simple());
        self.tx
            .send(DispatchedEvent {
                id: id.clone(),
                name: event_name.to_string(),
                payload,
            })
            .await
            .map_err(|_| anyhow!("Extraction runner is not accepting events"))?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_delivers_event_to_receiver() {
        let (dispatcher, mut rx) = InProcessDispatcher::channel(4);

        let id = dispatcher
            .send("document.uploaded", serde_json::json!({ "runId": "run_1" }))
            .await
            .unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.id, id);
        assert!(id.starts_with("evt_"));
        assert_eq!(event.name, "document.uploaded");
        assert_eq!(event.payload["runId"], "run_1");
    }

    #[tokio::test]
    async fn test_send_fails_when_runner_is_gone() {
        let (dispatcher, rx) = InProcessDispatcher::channel(1);
        drop(rx);

        let err = dispatcher
            .send("document.uploaded", serde_json::json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Extraction runner is not accepting events");
    }
}
