//! Kernel module - server infrastructure and dependencies.

pub mod completion;
pub mod deps;
pub mod dispatcher;
pub mod result_store;
pub mod runner;
pub mod test_dependencies;
pub mod traits;
pub mod workflows_client;

pub use completion::OpenAiCompletion;
pub use deps::ServerDeps;
pub use dispatcher::{DispatchedEvent, InProcessDispatcher};
pub use result_store::InMemoryResultStore;
pub use runner::ExtractionRunner;
pub use test_dependencies::{MockCompletion, MockDispatcher, TestDependencies};
pub use traits::*;
pub use workflows_client::WorkflowEventClient;
