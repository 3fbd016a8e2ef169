//! Application setup and router construction.

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Extension},
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::kernel::ServerDeps;
use crate::server::routes::{
    check_result_handler, document_uploaded_handler, health_handler, trigger_extraction_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AxumAppState {
    pub server_deps: Arc<ServerDeps>,
}

/// Build the Axum application router
///
/// `max_upload_bytes` bounds request bodies; inline documents travel base64-encoded
/// inside the JSON body.
pub fn build_app(server_deps: Arc<ServerDeps>, max_upload_bytes: usize) -> Router {
    let app_state = AxumAppState { server_deps };

    // CORS configuration - the browser client is served from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/api/trigger-extraction", post(trigger_extraction_handler))
        .route("/api/check-result/:run_id", get(check_result_handler))
        // Callback target for the external workflow service
        .route(
            "/api/workflows/document-uploaded",
            post(document_uploaded_handler),
        )
        .route("/health", get(health_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(Extension(app_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
