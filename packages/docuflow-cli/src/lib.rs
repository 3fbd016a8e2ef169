//! DocuFlow command-line client
//!
//! Uploads a document to the DocuFlow API, polls the run until it settles, and
//! tracks progress as a fixed list of processing steps.

pub mod api;
pub mod poller;
pub mod session;
pub mod steps;
pub mod upload;

pub use api::{ClientError, DocuflowApi, HttpDocuflowApi, StatusResponse, TriggerRequest};
pub use poller::{start_polling, PollConfig, PollHandle, PollOutcome, PollUpdate};
pub use session::{extraction_summary, ExtractionOptions, Session, SessionOutcome};
pub use steps::{ProcessingStep, ProcessingSteps, StepId, StepStatus};
pub use upload::{encode_file, remote_document, Document, UploadError};
