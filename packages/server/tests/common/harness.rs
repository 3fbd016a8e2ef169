//! Test harness that drives the Axum router in-process.
//!
//! Requests go through `tower::ServiceExt::oneshot`, so no socket is bound. The
//! dispatcher and completion seams are mocks from `TestDependencies`.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use server_core::config::DEFAULT_MAX_UPLOAD_BYTES;
use server_core::kernel::{MockCompletion, MockDispatcher, TestDependencies};
use server_core::server::build_app;
use test_context::AsyncTestContext;
use tower::ServiceExt;

/// Response status plus parsed JSON body.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Router wired to mock dependencies.
///
/// # Example using test-context
///
/// ```ignore
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &TestHarness) {
///     let response = ctx.get("/health").await;
/// }
/// ```
pub struct TestHarness {
    pub deps: TestDependencies,
    app: Router,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new()
    }

    async fn teardown(self) {
        // In-memory store is dropped with the harness
    }
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_deps(TestDependencies::new())
    }

    /// Harness whose model returns the queued responses of `completion`.
    pub fn with_completion(completion: MockCompletion) -> Self {
        Self::with_deps(TestDependencies::new().mock_completion(completion))
    }

    /// Harness whose dispatcher rejects every event.
    pub fn with_failing_dispatcher(message: &str) -> Self {
        Self::with_deps(TestDependencies::new().mock_dispatcher(MockDispatcher::failing(message)))
    }

    pub fn with_deps(deps: TestDependencies) -> Self {
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let app = build_app(Arc::new(deps.server_deps()), DEFAULT_MAX_UPLOAD_BYTES);
        Self { deps, app }
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method(Method::GET)
            .uri(path)
            .body(Body::empty())
            .expect("valid request");
        self.send(request).await
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> TestResponse {
        self.post_raw(path, body.to_string()).await
    }

    /// POST a body verbatim with a JSON content type.
    pub async fn post_raw(&self, path: &str, body: impl Into<String>) -> TestResponse {
        let request = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.into()))
            .expect("valid request");
        self.send(request).await
    }

    /// Deliver the most recently dispatched event to the workflow callback, the
    /// way the external workflow service would.
    pub async fn deliver_last_event(&self) -> TestResponse {
        let event = self
            .deps
            .dispatcher
            .last_event()
            .expect("an event was dispatched");
        self.post_json("/api/workflows/document-uploaded", &event.payload)
            .await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body is readable")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse { status, body }
    }
}
