//! Run status poller.
//!
//! Polls `check-result` at a fixed interval on a background task until the run
//! settles. At most one status request is in flight: a tick that comes due while a
//! request is still outstanding is skipped, so a late response can never overwrite
//! a newer one.
//!
//! # Example
//!
//! ```ignore
//! let (tx, mut rx) = mpsc::channel(16);
//! let handle = start_polling(api, run_id, PollConfig::default(), tx);
//! while let Some(update) = rx.recv().await { /* render */ }
//! let outcome = handle.outcome().await;
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::api::{DocuflowApi, RunState};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    /// Overall limit; `None` polls until the run settles or the handle is cancelled
    pub max_wait: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_wait: Some(DEFAULT_MAX_WAIT),
        }
    }
}

/// Progress reported while the run is still going
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollUpdate {
    Running { attempt: u32, status: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Completed(Value),
    Failed(String),
    TimedOut,
    Cancelled,
    /// A status request failed; polling does not retry
    Transport(String),
}

/// Handle to a running poll task.
pub struct PollHandle {
    cancel: CancellationToken,
    task: JoinHandle<PollOutcome>,
}

impl PollHandle {
    /// Stop polling. Safe to call any number of times, before or after the task ends.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the poll task to end.
    pub async fn outcome(self) -> PollOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => PollOutcome::Cancelled,
            Err(e) => PollOutcome::Transport(format!("Poll task failed: {}", e)),
        }
    }
}

/// Start polling `run_id`. The first request goes out immediately.
///
/// `updates` receives one `PollUpdate` per non-terminal response and is dropped when
/// polling ends.
pub fn start_polling(
    api: Arc<dyn DocuflowApi>,
    run_id: String,
    config: PollConfig,
    updates: mpsc::Sender<PollUpdate>,
) -> PollHandle {
    let cancel = CancellationToken::new();
    let task = tokio::spawn(poll_loop(api, run_id, config, updates, cancel.clone()));
    PollHandle { cancel, task }
}

async fn poll_loop(
    api: Arc<dyn DocuflowApi>,
    run_id: String,
    config: PollConfig,
    updates: mpsc::Sender<PollUpdate>,
    cancel: CancellationToken,
) -> PollOutcome {
    let deadline = config.max_wait.map(|wait| Instant::now() + wait);
    let mut ticker = time::interval(config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut attempt: u32 = 0;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return PollOutcome::Cancelled,
            _ = wait_until(deadline) => return PollOutcome::TimedOut,
            _ = ticker.tick() => {}
        }

        attempt += 1;
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return PollOutcome::Cancelled,
            _ = wait_until(deadline) => return PollOutcome::TimedOut,
            response = api.status(&run_id) => response,
        };

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                debug!(run_id = %run_id, attempt, error = %e, "Status request failed");
                return PollOutcome::Transport(e.to_string());
            }
        };

        match response.state() {
            RunState::Completed(data) => return PollOutcome::Completed(data),
            RunState::Failed(reason) => return PollOutcome::Failed(reason),
            RunState::Running => {
                debug!(run_id = %run_id, attempt, status = %response.status, "Run still in progress");
                // Receiver gone means nobody is rendering; keep polling for the outcome
                let _ = updates
                    .send(PollUpdate::Running {
                        attempt,
                        status: response.status,
                    })
                    .await;
            }
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
