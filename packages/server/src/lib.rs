// DocuFlow - document extraction API core
//
// Accepts document uploads, hands them to a workflow dispatcher, runs LLM field
// extraction in the worker, and serves job status from an in-memory result store.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
