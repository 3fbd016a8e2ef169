//! Server dependencies (using traits for testability)
//!
//! Central dependency container handed to actions, activities and route handlers.
//! All external services sit behind trait objects so tests can swap in fakes.

use std::sync::Arc;

use crate::kernel::{BaseCompletion, BaseDispatcher, BaseResultStore};

/// Server dependencies accessible to actions and activities
#[derive(Clone)]
pub struct ServerDeps {
    /// Run id -> job record. Written by the extraction worker, read by the status endpoint.
    pub result_store: Arc<dyn BaseResultStore>,
    /// Workflow hand-off for `document.uploaded` events
    pub dispatcher: Arc<dyn BaseDispatcher>,
    /// Generative model used by the extraction worker
    pub completion: Arc<dyn BaseCompletion>,
}

impl ServerDeps {
    pub fn new(
        result_store: Arc<dyn BaseResultStore>,
        dispatcher: Arc<dyn BaseDispatcher>,
        completion: Arc<dyn BaseCompletion>,
    ) -> Self {
        Self {
            result_store,
            dispatcher,
            completion,
        }
    }
}
