use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle status of an extraction run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Completed,
    Failed,
}

/// Stored state of one extraction run, keyed by run id in the result store.
///
/// Serialized as `{ "status": "pending" }`, `{ "status": "completed", "data": {..} }`
/// or `{ "status": "failed", "error": "..." }`. A record starts `Pending` and moves to
/// exactly one terminal state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobRecord {
    Pending,
    Completed { data: Value },
    Failed { error: String },
}

impl JobRecord {
    pub fn completed(data: Value) -> Self {
        JobRecord::Completed { data }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        JobRecord::Failed {
            error: error.into(),
        }
    }

    pub fn status(&self) -> JobStatus {
        match self {
            JobRecord::Pending => JobStatus::Pending,
            JobRecord::Completed { .. } => JobStatus::Completed,
            JobRecord::Failed { .. } => JobStatus::Failed,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobRecord::Pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_shape_matches_status_endpoint() {
        assert_eq!(
            serde_json::to_value(JobRecord::Pending).unwrap(),
            json!({ "status": "pending" })
        );
        assert_eq!(
            serde_json::to_value(JobRecord::completed(json!({ "extractedData": {} }))).unwrap(),
            json!({ "status": "completed", "data": { "extractedData": {} } })
        );
        assert_eq!(
            serde_json::to_value(JobRecord::failed("model unavailable")).unwrap(),
            json!({ "status": "failed", "error": "model unavailable" })
        );
    }

    #[test]
    fn status_and_terminality() {
        assert_eq!(JobRecord::Pending.status(), JobStatus::Pending);
        assert!(!JobRecord::Pending.is_terminal());
        assert!(JobRecord::completed(json!({})).is_terminal());
        assert_eq!(JobRecord::failed("x").status(), JobStatus::Failed);
    }
}
