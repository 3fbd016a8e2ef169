//! Process-local result store.
//!
//! Records live for the lifetime of the process; nothing is evicted. `clear()` is
//! called once on graceful shutdown.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domains::documents::JobRecord;
use crate::kernel::BaseResultStore;

/// In-memory `BaseResultStore`.
///
/// Cloneable handle; clones share the same map. Reads copy the whole record and
/// writes replace it, so readers never observe a partial record.
#[derive(Clone, Default)]
pub struct InMemoryResultStore {
    records: Arc<RwLock<HashMap<String, JobRecord>>>,
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseResultStore for InMemoryResultStore {
    async fn get(&self, run_id: &str) -> Result<Option<JobRecord>> {
        Ok(self.records.read().await.get(run_id).cloned())
    }

    async fn set(&self, run_id: &str, record: JobRecord) -> Result<()> {
        self.records
            .write()
            .await
            .insert(run_id.to_string(), record);
        Ok(())
    }

    async fn set_if_absent(&self, run_id: &str, record: JobRecord) -> Result<bool> {
        let mut records = self.records.write().await;
        if records.contains_key(run_id) {
            return Ok(false);
        }
        records.insert(run_id.to_string(), record);
        Ok(true)
    }

    async fn settle(&self, run_id: &str, record: JobRecord) -> Result<JobRecord> {
        let mut records = self.records.write().await;
        match records.get(run_id) {
            Some(existing) if existing.is_terminal() => Ok(existing.clone()),
            _ => {
                records.insert(run_id.to_string(), record.clone());
                Ok(record)
            }
        }
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.records.read().await.len())
    }

    async fn clear(&self) -> Result<()> {
        self.records.write().await.clear();
        Ok(())
    }
}
