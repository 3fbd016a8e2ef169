//! Run identifiers.
//!
//! Run ids are opaque strings to clients. They are minted from UUID v7 so ids
//! sort by creation time in logs.

use uuid::Uuid;

/// Prefix carried by every run id.
pub const RUN_ID_PREFIX: &str = "run_";

/// Mint a fresh run id (`run_<uuid v7, simple form>`).
pub fn new_run_id() -> String {
    format!("{}{}", RUN_ID_PREFIX, Uuid::now_v7().simple())
}
