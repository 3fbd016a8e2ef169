// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Business logic (media-type resolution, prompt construction, result parsing) lives in
// domain functions that use these traits.
//
// Naming convention: Base* for trait names (e.g., BaseCompletion, BaseDispatcher)

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domains::documents::JobRecord;

// =============================================================================
// Result Store Trait (Infrastructure - run id -> job record)
// =============================================================================

#[async_trait]
pub trait BaseResultStore: Send + Sync {
    /// Current record for `run_id`, `None` when the id was never stored
    async fn get(&self, run_id: &str) -> Result<Option<JobRecord>>;

    /// Replace the record for `run_id` unconditionally (last write wins)
    async fn set(&self, run_id: &str, record: JobRecord) -> Result<()>;

    /// Store `record` only if `run_id` has no record yet. Returns whether it was stored.
    ///
    /// Every `pending` write goes through here so a terminal record is never reset.
    /// The default is not atomic; stores that can do better override it.
    async fn set_if_absent(&self, run_id: &str, record: JobRecord) -> Result<bool> {
        if self.get(run_id).await?.is_some() {
            return Ok(false);
        }
        self.set(run_id, record).await?;
        Ok(true)
    }

    /// Store the terminal `record` only while `run_id` is pending or unknown.
    ///
    /// Returns the record held afterwards: `record` when it was stored, otherwise the
    /// terminal record already there. A run settles exactly once.
    /// The default is not atomic; stores that can do better override it.
    async fn settle(&self, run_id: &str, record: JobRecord) -> Result<JobRecord> {
        match self.get(run_id).await? {
            Some(existing) if existing.is_terminal() => Ok(existing),
            _ => {
                self.set(run_id, record.clone()).await?;
                Ok(record)
            }
        }
    }

    /// Number of records held
    async fn len(&self) -> Result<usize>;

    /// Drop every record (process teardown)
    async fn clear(&self) -> Result<()>;
}

// =============================================================================
// Dispatcher Trait (Infrastructure - workflow event hand-off)
// =============================================================================

#[async_trait]
pub trait BaseDispatcher: Send + Sync {
    /// Hand an event to the workflow layer. Returns the dispatch id.
    ///
    /// Returns once the event is accepted; the work itself runs later.
    async fn send(&self, event_name: &str, payload: serde_json::Value) -> Result<String>;
}

// =============================================================================
// Completion Trait (Infrastructure - generative model with a media attachment)
// =============================================================================

/// Requested shape of the model's response text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    Text,
    Json,
}

/// Document handed to the model alongside the prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAttachment {
    /// `data:` URI or remote URL
    pub url: String,
    pub media_type: String,
    pub file_name: Option<String>,
}

#[async_trait]
pub trait BaseCompletion: Send + Sync {
    /// Run `prompt` against the attached document and return the raw response text
    async fn generate(
        &self,
        prompt: &str,
        attachment: &MediaAttachment,
        mode: OutputMode,
    ) -> Result<String>;
}
