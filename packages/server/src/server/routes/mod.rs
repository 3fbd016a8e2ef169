// HTTP routes
pub mod extraction;
pub mod health;
pub mod workflows;

pub use extraction::*;
pub use health::*;
pub use workflows::*;
