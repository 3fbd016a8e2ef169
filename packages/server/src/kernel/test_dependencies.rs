// TestDependencies - mock implementations for testing
//
// Provides deterministic fakes for the dispatcher and completion seams that can be
// wired into ServerDeps for unit and integration tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::{
    BaseCompletion, BaseDispatcher, InMemoryResultStore, MediaAttachment, OutputMode, ServerDeps,
};

// =============================================================================
// Mock Completion (Generative model)
// =============================================================================

/// Arguments captured from a generate call
#[derive(Debug, Clone)]
pub struct CompletionCall {
    pub prompt: String,
    pub attachment: MediaAttachment,
    pub mode: OutputMode,
}

pub struct MockCompletion {
    responses: Arc<Mutex<VecDeque<Result<String, String>>>>,
    calls: Arc<Mutex<Vec<CompletionCall>>>,
}

impl MockCompletion {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a response text
    pub fn with_response(self, text: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(text.to_string()));
        self
    }

    /// Queue a JSON response
    pub fn with_json_response(self, value: serde_json::Value) -> Self {
        self.with_response(&value.to_string())
    }

    /// Queue a failed call
    pub fn with_error(self, message: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
        self
    }

    /// Get all generate calls
    pub fn calls(&self) -> Vec<CompletionCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Default for MockCompletion {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseCompletion for MockCompletion {
    async fn generate(
        &self,
        prompt: &str,
        attachment: &MediaAttachment,
        mode: OutputMode,
    ) -> Result<String> {
        self.calls.lock().unwrap().push(CompletionCall {
            prompt: prompt.to_string(),
            attachment: attachment.clone(),
            mode,
        });

        // Queued responses first, then an empty object
        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Ok("{}".to_string()),
        }
    }
}

// =============================================================================
// Mock Dispatcher (Workflow hand-off)
// =============================================================================

/// An event captured by the mock dispatcher
#[derive(Debug, Clone)]
pub struct SentEvent {
    pub name: String,
    pub payload: serde_json::Value,
}

pub struct MockDispatcher {
    sent: Arc<Mutex<Vec<SentEvent>>>,
    rejected: Arc<Mutex<Vec<SentEvent>>>,
    failure: Option<String>,
}

impl MockDispatcher {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            rejected: Arc::new(Mutex::new(Vec::new())),
            failure: None,
        }
    }

    /// Reject every send with `message`
    pub fn failing(message: &str) -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            rejected: Arc::new(Mutex::new(Vec::new())),
            failure: Some(message.to_string()),
        }
    }

    /// Get all accepted events
    pub fn sent(&self) -> Vec<SentEvent> {
        self.sent.lock().unwrap().clone()
    }

    /// Events turned away by a failing dispatcher
    pub fn rejected(&self) -> Vec<SentEvent> {
        self.rejected.lock().unwrap().clone()
    }

    /// Most recent accepted event
    pub fn last_event(&self) -> Option<SentEvent> {
        self.sent.lock().unwrap().last().cloned()
    }
}

impl Default for MockDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseDispatcher for MockDispatcher {
    async fn send(&self, event_name: &str, payload: serde_json::Value) -> Result<String> {
        if let Some(message) = &self.failure {
            self.rejected.lock().unwrap().push(SentEvent {
                name: event_name.to_string(),
                payload,
            });
            return Err(anyhow!(message.clone()));
        }

        let mut sent = self.sent.lock().unwrap();
        sent.push(SentEvent {
            name: event_name.to_string(),
            payload,
        });
        Ok(format!("evt_{}", sent.len()))
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

/// Fakes plus a real in-memory store, with handles kept for assertions.
pub struct TestDependencies {
    pub result_store: Arc<InMemoryResultStore>,
    pub dispatcher: Arc<MockDispatcher>,
    pub completion: Arc<MockCompletion>,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            result_store: Arc::new(InMemoryResultStore::new()),
            dispatcher: Arc::new(MockDispatcher::new()),
            completion: Arc::new(MockCompletion::new()),
        }
    }

    pub fn mock_completion(mut self, completion: MockCompletion) -> Self {
        self.completion = Arc::new(completion);
        self
    }

    pub fn mock_dispatcher(mut self, dispatcher: MockDispatcher) -> Self {
        self.dispatcher = Arc::new(dispatcher);
        self
    }

    /// Build ServerDeps sharing this instance's fakes
    pub fn server_deps(&self) -> ServerDeps {
        ServerDeps::new(
            self.result_store.clone(),
            self.dispatcher.clone(),
            self.completion.clone(),
        )
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
