//! Processing steps shown to the user while a document moves through the pipeline.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepId {
    Upload,
    Extraction,
    Transformation,
    Notification,
    Complete,
}

impl StepId {
    pub const ALL: [StepId; 5] = [
        StepId::Upload,
        StepId::Extraction,
        StepId::Transformation,
        StepId::Notification,
        StepId::Complete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StepId::Upload => "upload",
            StepId::Extraction => "extraction",
            StepId::Transformation => "transformation",
            StepId::Notification => "notification",
            StepId::Complete => "complete",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StepId::Upload => "Document Upload",
            StepId::Extraction => "AI Data Extraction",
            StepId::Transformation => "Data Structuring",
            StepId::Notification => "Notifications",
            StepId::Complete => "Process Complete",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            StepId::Upload => "Select and upload your document for processing.",
            StepId::Extraction => "AI is analyzing the document.",
            StepId::Transformation => "Formatting extracted data for review.",
            StepId::Notification => {
                "Relevant parties will be alerted upon completion (simulated)."
            }
            StepId::Complete => "The document workflow has finished.",
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingStep {
    pub id: StepId,
    pub status: StepStatus,
    pub details: Option<String>,
}

/// Ordered display state for the five pipeline steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingSteps {
    steps: Vec<ProcessingStep>,
}

impl Default for ProcessingSteps {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingSteps {
    pub fn new() -> Self {
        Self {
            steps: StepId::ALL
                .iter()
                .map(|&id| ProcessingStep {
                    id,
                    status: StepStatus::Pending,
                    details: None,
                })
                .collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProcessingStep> {
        self.steps.iter()
    }

    pub fn get(&self, id: StepId) -> &ProcessingStep {
        // Every StepId has exactly one entry
        &self.steps[Self::index(id)]
    }

    /// Set a step's status. `details` replaces the previous text only when given.
    pub fn update(&mut self, id: StepId, status: StepStatus, details: Option<&str>) {
        let step = &mut self.steps[Self::index(id)];
        step.status = status;
        if let Some(details) = details {
            step.details = Some(details.to_string());
        }
    }

    /// Attach an error to the step in progress, or to `upload` when none is.
    ///
    /// Returns the step that was marked failed.
    pub fn fail_active(&mut self, message: &str) -> StepId {
        let id = self.active().unwrap_or(StepId::Upload);
        self.update(id, StepStatus::Failed, Some(message));
        id
    }

    pub fn active(&self) -> Option<StepId> {
        self.steps
            .iter()
            .find(|step| step.status == StepStatus::InProgress)
            .map(|step| step.id)
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn index(id: StepId) -> usize {
        id as usize
    }
}
