//! One extraction session: trigger, poll, and keep the processing steps current.
//!
//! A session owns at most one poll at a time. Starting over cancels the previous
//! poll before anything else happens, so a restarted workflow never leaves a poll
//! running for the old run.

use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::api::DocuflowApi;
use crate::poller::{start_polling, PollConfig, PollHandle, PollOutcome, PollUpdate};
use crate::steps::{ProcessingSteps, StepId, StepStatus};
use crate::upload::Document;

const UPDATE_BUFFER: usize = 16;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    Completed { extracted: Map<String, Value> },
    Failed { step: StepId, message: String },
    Cancelled,
}

/// Options sent along with every document
#[derive(Debug, Clone, Default)]
pub struct ExtractionOptions {
    pub description: Option<String>,
    pub fields: Vec<String>,
}

pub struct Session {
    api: Arc<dyn DocuflowApi>,
    config: PollConfig,
    steps: ProcessingSteps,
    active: Option<PollHandle>,
}

impl Session {
    pub fn new(api: Arc<dyn DocuflowApi>, config: PollConfig) -> Self {
        Self {
            api,
            config,
            steps: ProcessingSteps::new(),
            active: None,
        }
    }

    pub fn steps(&self) -> &ProcessingSteps {
        &self.steps
    }

    /// Stop the active poll, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.active.take() {
            handle.cancel();
        }
    }

    /// Start over: cancel the active poll, then reset the steps.
    pub fn begin(&mut self) {
        self.cancel();
        self.steps.reset();
        self.steps.update(
            StepId::Upload,
            StepStatus::InProgress,
            Some("Preparing to upload document..."),
        );
    }

    /// Drive one document through trigger and polling. `on_change` sees every
    /// change to the steps.
    pub async fn run(
        &mut self,
        document: Document,
        options: ExtractionOptions,
        on_change: &mut (dyn FnMut(&ProcessingSteps) + Send),
    ) -> SessionOutcome {
        self.begin();
        on_change(&self.steps);

        let file_name = document.file_name().to_string();
        self.steps.update(
            StepId::Upload,
            StepStatus::Completed,
            Some(&format!("Document \"{}\" uploaded successfully.", file_name)),
        );
        self.steps.update(
            StepId::Extraction,
            StepStatus::InProgress,
            Some("Triggering AI extraction..."),
        );
        on_change(&self.steps);

        let request = document.into_request(options.description, options.fields);
        let run_id = match self.api.trigger(&request).await {
            Ok(run_id) => run_id,
            Err(e) => return self.fail(format!("Failed to trigger extraction: {}", e), on_change),
        };

        info!(run_id = %run_id, file_name = %file_name, "Extraction job started");
        self.steps.update(
            StepId::Extraction,
            StepStatus::InProgress,
            Some("AI extraction job queued. Waiting for processing..."),
        );
        on_change(&self.steps);

        let (tx, mut updates) = mpsc::channel(UPDATE_BUFFER);
        self.active = Some(start_polling(self.api.clone(), run_id, self.config, tx));

        // Ends when the poll task drops its sender
        while let Some(PollUpdate::Running { attempt, status }) = updates.recv().await {
            debug!(attempt, status = %status, "Extraction still running");
            let details = if status == "pending" {
                "AI extraction job queued. Waiting for processing...".to_string()
            } else {
                "AI is actively processing the document...".to_string()
            };
            self.steps
                .update(StepId::Extraction, StepStatus::InProgress, Some(&details));
            on_change(&self.steps);
        }

        let outcome = match self.active.take() {
            Some(handle) => handle.outcome().await,
            None => PollOutcome::Cancelled,
        };

        match outcome {
            PollOutcome::Completed(data) => self.complete(&data, on_change),
            PollOutcome::Failed(reason) => self.fail(reason, on_change),
            PollOutcome::Transport(message) => {
                self.fail(format!("Failed to check job status: {}", message), on_change)
            }
            PollOutcome::TimedOut => {
                let waited = self.config.max_wait.map(|d| d.as_secs()).unwrap_or_default();
                self.fail(
                    format!("Timed out after {}s waiting for extraction", waited),
                    on_change,
                )
            }
            PollOutcome::Cancelled => SessionOutcome::Cancelled,
        }
    }

    fn complete(
        &mut self,
        data: &Value,
        on_change: &mut (dyn FnMut(&ProcessingSteps) + Send),
    ) -> SessionOutcome {
        let extracted = data
            .get("extractedData")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        self.steps.update(
            StepId::Extraction,
            StepStatus::Completed,
            Some(&format!(
                "AI processing complete. {}",
                extraction_summary(&extracted)
            )),
        );
        self.steps.update(
            StepId::Transformation,
            StepStatus::Completed,
            Some("Data structured and validated."),
        );
        self.steps.update(
            StepId::Notification,
            StepStatus::Completed,
            Some("Stakeholders notified (simulation)."),
        );
        self.steps.update(
            StepId::Complete,
            StepStatus::Completed,
            Some("Workflow finished successfully."),
        );
        on_change(&self.steps);

        SessionOutcome::Completed { extracted }
    }

    fn fail(
        &mut self,
        message: String,
        on_change: &mut (dyn FnMut(&ProcessingSteps) + Send),
    ) -> SessionOutcome {
        let step = self.steps.fail_active(&message);
        on_change(&self.steps);
        SessionOutcome::Failed { step, message }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.cancel();
    }
}

pub fn extraction_summary(extracted: &Map<String, Value>) -> String {
    if extracted.is_empty() {
        "No specific fields were extracted by AI.".to_string()
    } else {
        format!("{} fields extracted.", extracted.len())
    }
}
