// Common types and utilities shared across the application

pub mod error;
pub mod id;

pub use error::ApiError;
pub use id::new_run_id;
