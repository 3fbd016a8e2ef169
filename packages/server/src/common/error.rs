//! HTTP-facing error type.
//!
//! Every failure leaving a route handler is rendered as `{ "error": "<message>" }`
//! with a status code picked from the variant.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

use crate::domains::documents::{DocumentRefError, TriggerError};

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed request (bad body, missing document, missing content type)
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// A collaborator service (workflow dispatch) rejected or failed the call
    #[error("{0}")]
    Upstream(String),

    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DocumentRefError> for ApiError {
    fn from(err: DocumentRefError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<TriggerError> for ApiError {
    fn from(err: TriggerError) -> Self {
        match err {
            TriggerError::InvalidDocument(e) => e.into(),
            TriggerError::Dispatch(message) => ApiError::Upstream(message),
            TriggerError::Internal(e) => ApiError::Internal(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        if status.is_server_error() {
            error!(status = %status, error = %message, "Request failed");
        } else {
            debug!(status = %status, error = %message, "Request rejected");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}
