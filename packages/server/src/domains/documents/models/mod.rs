pub mod document_ref;
pub mod job_record;

pub use document_ref::{resolve_media_type, DocumentRef, DocumentRefError};
pub use job_record::{JobRecord, JobStatus};
