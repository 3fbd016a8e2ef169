//! Extraction runner for in-process event handling.
//!
//! The `ExtractionRunner` is a background service that:
//! - Receives events from the `InProcessDispatcher` channel
//! - Spawns one task per event and hands it to the domain event handler
//! - Stops when cancelled or when every dispatcher handle is dropped
//!
//! # Example
//!
//! ```ignore
//! let (dispatcher, events) = InProcessDispatcher::channel(256);
//! let deps = Arc::new(ServerDeps::new(store, Arc::new(dispatcher), completion));
//!
//! let runner = ExtractionRunner::new(events, deps.clone(), shutdown.clone());
//! tokio::spawn(runner.run());
//! ```

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::domains::documents::handle_event;
use crate::kernel::{DispatchedEvent, ServerDeps};

/// Background service that runs workflow events dispatched in-process.
pub struct ExtractionRunner {
    events: mpsc::Receiver<DispatchedEvent>,
    deps: Arc<ServerDeps>,
    shutdown: CancellationToken,
}

impl ExtractionRunner {
    pub fn new(
        events: mpsc::Receiver<DispatchedEvent>,
        deps: Arc<ServerDeps>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            events,
            deps,
            shutdown,
        }
    }

    /// Run until shutdown. In-flight event tasks are not awaited.
    pub async fn run(mut self) {
        info!("Extraction runner started");

        loop {
            let event = tokio::select! {
                _ = self.shutdown.cancelled() => break,
                event = self.events.recv() => match event {
                    Some(event) => event,
                    None => break,
                },
            };

            debug!(event_id = %event.id, event = %event.name, "Running dispatched event");

            let deps = self.deps.clone();
            tokio::spawn(async move {
                match handle_event(&event.name, event.payload, &deps).await {
                    Ok(Some(record)) => {
                        debug!(event_id = %event.id, status = ?record.status(), "Event handled")
                    }
                    Ok(None) => warn!(event_id = %event.id, event = %event.name, "No handler for event"),
                    Err(e) => error!(event_id = %event.id, error = %e, "Event handler failed"),
                }
            });
        }

        info!("Extraction runner stopped");
    }
}
