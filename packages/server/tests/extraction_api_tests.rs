//! Integration tests for the extraction HTTP API.
//!
//! Covers the trigger -> workflow callback -> check-result round trip, request
//! validation, and dispatch failures.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use server_core::domains::documents::JobRecord;
use server_core::kernel::{BaseResultStore, MockCompletion};
use test_context::test_context;

use crate::common::TestHarness;

const PDF_DATA_URI: &str = "data:application/pdf;base64,JVBERi0xLjQK";

fn run_id_of(body: &serde_json::Value) -> String {
    body["runId"]
        .as_str()
        .expect("runId in trigger response")
        .to_string()
}

// =============================================================================
// Trigger -> callback -> result
// =============================================================================

#[tokio::test]
async fn inline_document_completes_with_extracted_fields() {
    let ctx = TestHarness::with_completion(
        MockCompletion::new().with_json_response(json!({ "invoice_number": "INV-7", "total": "42.00" })),
    );

    let trigger = ctx
        .post_json(
            "/api/trigger-extraction",
            &json!({
                "documentDataUri": PDF_DATA_URI,
                "description": "Supplier invoice",
                "fileName": "invoice.pdf",
                "fields": ["invoice_number", "total"]
            }),
        )
        .await;
    assert_eq!(trigger.status, StatusCode::OK);
    let run_id = run_id_of(&trigger.body);
    assert!(run_id.starts_with("run_"));

    // Before the worker runs, the run is visible as pending
    let pending = ctx.get(&format!("/api/check-result/{}", run_id)).await;
    assert_eq!(pending.status, StatusCode::OK);
    assert_eq!(pending.body, json!({ "status": "pending" }));

    let delivered = ctx.deliver_last_event().await;
    assert_eq!(delivered.status, StatusCode::OK);

    let done = ctx.get(&format!("/api/check-result/{}", run_id)).await;
    assert_eq!(done.status, StatusCode::OK);
    assert_eq!(
        done.body,
        json!({
            "status": "completed",
            "data": { "extractedData": { "invoice_number": "INV-7", "total": "42.00" } }
        })
    );

    let calls = ctx.deps.completion.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].attachment.media_type, "application/pdf");
    assert_eq!(calls[0].attachment.file_name.as_deref(), Some("invoice.pdf"));
    assert!(calls[0].prompt.contains("invoice_number, total"));
}

#[tokio::test]
async fn terminal_result_is_stable_across_reads() {
    let ctx = TestHarness::with_completion(MockCompletion::new().with_error("model overloaded"));

    let trigger = ctx
        .post_json("/api/trigger-extraction", &json!({ "documentDataUri": PDF_DATA_URI }))
        .await;
    let run_id = run_id_of(&trigger.body);
    ctx.deliver_last_event().await;

    let first = ctx.get(&format!("/api/check-result/{}", run_id)).await;
    let second = ctx.get(&format!("/api/check-result/{}", run_id)).await;

    assert_eq!(first.body["status"], "failed");
    assert_eq!(
        first.body["error"],
        "Extraction model call failed: model overloaded"
    );
    assert_eq!(first.body, second.body);
}

#[tokio::test]
async fn redelivered_event_keeps_first_result() {
    let ctx = TestHarness::with_completion(
        MockCompletion::new()
            .with_json_response(json!({ "total": 1 }))
            .with_error("boom"),
    );

    let trigger = ctx
        .post_json("/api/trigger-extraction", &json!({ "documentDataUri": PDF_DATA_URI }))
        .await;
    let run_id = run_id_of(&trigger.body);

    let first = ctx.deliver_last_event().await;
    let redelivered = ctx.deliver_last_event().await;

    let expected = json!({ "status": "completed", "data": { "extractedData": { "total": 1 } } });
    assert_eq!(first.body, expected);
    assert_eq!(redelivered.status, StatusCode::OK);
    assert_eq!(redelivered.body, expected);

    let stored = ctx.deps.result_store.get(&run_id).await.unwrap();
    assert_eq!(
        stored,
        Some(JobRecord::completed(json!({ "extractedData": { "total": 1 } })))
    );
    assert_eq!(ctx.deps.completion.call_count(), 1);
}

#[tokio::test]
async fn unparsable_model_output_completes_with_no_fields() {
    let ctx = TestHarness::with_completion(
        MockCompletion::new().with_response("I could not find any fields in this image."),
    );

    let trigger = ctx
        .post_json(
            "/api/trigger-extraction",
            &json!({ "documentDataUri": "data:image/png;base64,iVBORw0KGgo=" }),
        )
        .await;
    let run_id = run_id_of(&trigger.body);
    ctx.deliver_last_event().await;

    let done = ctx.get(&format!("/api/check-result/{}", run_id)).await;
    assert_eq!(
        done.body,
        json!({ "status": "completed", "data": { "extractedData": {} } })
    );
}

#[tokio::test]
async fn remote_document_with_content_type_is_dispatched() {
    let ctx = TestHarness::new();

    let trigger = ctx
        .post_json(
            "/api/trigger-extraction",
            &json!({
                "documentDataUri": "https://files.example.com/scan.tiff",
                "contentType": "image/tiff"
            }),
        )
        .await;
    assert_eq!(trigger.status, StatusCode::OK);

    ctx.deliver_last_event().await;
    let calls = ctx.deps.completion.calls();
    assert_eq!(calls[0].attachment.url, "https://files.example.com/scan.tiff");
    assert_eq!(calls[0].attachment.media_type, "image/tiff");
}

// =============================================================================
// Validation
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn remote_document_without_content_type_is_rejected(ctx: &TestHarness) {
    let response = ctx
        .post_json(
            "/api/trigger-extraction",
            &json!({ "documentDataUri": "https://files.example.com/scan.pdf" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body,
        json!({ "error": "contentType is required for URL-based documents" })
    );
    assert!(ctx.deps.dispatcher.sent().is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn missing_document_is_rejected(ctx: &TestHarness) {
    let response = ctx
        .post_json("/api/trigger-extraction", &json!({ "description": "nothing" }))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Document data URI is required");
    assert!(ctx.deps.dispatcher.sent().is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn unrecognized_reference_is_rejected(ctx: &TestHarness) {
    let response = ctx
        .post_json(
            "/api/trigger-extraction",
            &json!({ "documentDataUri": "ftp://files.example.com/doc.pdf" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["error"],
        "Invalid documentDataUri format: Missing or invalid MIME type."
    );
}

#[test_context(TestHarness)]
#[tokio::test]
async fn malformed_json_is_rejected_with_error_envelope(ctx: &TestHarness) {
    let response = ctx
        .post_raw("/api/trigger-extraction", "{ not json")
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["error"].is_string());
    assert!(ctx.deps.dispatcher.sent().is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn unknown_run_is_not_found(ctx: &TestHarness) {
    let response = ctx.get("/api/check-result/run_does_not_exist").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body, json!({ "error": "Job not found" }));
}

// =============================================================================
// Dispatch failures and health
// =============================================================================

#[tokio::test]
async fn dispatch_failure_is_a_server_error() {
    let ctx = TestHarness::with_failing_dispatcher("workflow service unreachable");

    let response = ctx
        .post_json("/api/trigger-extraction", &json!({ "documentDataUri": PDF_DATA_URI }))
        .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.body,
        json!({ "error": "workflow service unreachable" })
    );
}

#[test_context(TestHarness)]
#[tokio::test]
async fn health_reports_tracked_jobs(ctx: &TestHarness) {
    let before = ctx.get("/health").await;
    assert_eq!(before.status, StatusCode::OK);
    assert_eq!(before.body, json!({ "status": "healthy", "jobs_tracked": 0 }));

    ctx.post_json("/api/trigger-extraction", &json!({ "documentDataUri": PDF_DATA_URI }))
        .await;

    let after = ctx.get("/health").await;
    assert_eq!(after.body["jobs_tracked"], 1);
}
