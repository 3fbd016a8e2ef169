//! Document extraction activity (the extraction worker).
//!
//! Runs once per `document.uploaded` event:
//! mark pending -> resolve media type -> build prompt -> call model -> parse -> store.

use anyhow::{Context, Result};
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use super::prompt::{build_extraction_prompt, parse_extracted_fields};
use crate::domains::documents::events::DocumentUploaded;
use crate::domains::documents::models::{resolve_media_type, JobRecord};
use crate::kernel::{MediaAttachment, OutputMode, ServerDeps};

/// Run extraction for one uploaded document and record the outcome.
///
/// Extraction failures become a `failed` record; the returned error is reserved
/// for the result store itself failing. A run that already settled is returned
/// as stored, without calling the model again.
pub async fn extract_document(event: &DocumentUploaded, deps: &ServerDeps) -> Result<JobRecord> {
    let run_id = event.run_id.as_str();

    let registered = deps
        .result_store
        .set_if_absent(run_id, JobRecord::Pending)
        .await
        .context("Failed to mark run pending")?;

    if registered {
        info!(run_id = %run_id, "Run was not registered by trigger, marked pending");
    } else if let Some(existing) = deps
        .result_store
        .get(run_id)
        .await
        .context("Failed to read run")?
        .filter(JobRecord::is_terminal)
    {
        info!(run_id = %run_id, status = ?existing.status(), "Run already settled, skipping redelivery");
        return Ok(existing);
    }

    let record = match run_extraction(event, deps).await {
        Ok(fields) => {
            info!(run_id = %run_id, fields = fields.len(), "Document extraction completed");
            JobRecord::completed(json!({ "extractedData": fields }))
        }
        Err(e) => {
            warn!(run_id = %run_id, error = %format!("{:#}", e), "Document extraction failed");
            JobRecord::failed(format!("{:#}", e))
        }
    };

    let settled = deps
        .result_store
        .settle(run_id, record.clone())
        .await
        .context("Failed to record extraction result")?;

    if settled != record {
        info!(run_id = %run_id, "Run settled by a concurrent delivery, keeping stored result");
    }

    Ok(settled)
}

async fn run_extraction(event: &DocumentUploaded, deps: &ServerDeps) -> Result<Map<String, Value>> {
    // Rejects bad references before any model call
    let media_type = resolve_media_type(&event.document_data_uri, event.content_type.as_deref())?;

    let prompt = build_extraction_prompt(&event.description, event.fields.as_deref());
    let attachment = MediaAttachment {
        url: event.document_data_uri.trim().to_string(),
        media_type,
        file_name: Some(event.file_name.clone()),
    };

    let text = deps
        .completion
        .generate(&prompt, &attachment, OutputMode::Json)
        .await
        .context("Extraction model call failed")?;

    Ok(parse_extracted_fields(&text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::documents::data::{DEFAULT_DESCRIPTION, DEFAULT_FILE_NAME};
    use crate::kernel::{BaseResultStore, MockCompletion, TestDependencies};

    fn event(reference: &str, content_type: Option<&str>) -> DocumentUploaded {
        DocumentUploaded {
            run_id: "run_test".to_string(),
            document_data_uri: reference.to_string(),
            content_type: content_type.map(str::to_string),
            description: DEFAULT_DESCRIPTION.to_string(),
            file_name: DEFAULT_FILE_NAME.to_string(),
            fields: None,
        }
    }

    #[tokio::test]
    async fn test_completed_run_wraps_fields() {
        let test_deps = TestDependencies::new().mock_completion(
            MockCompletion::new().with_json_response(json!({ "total": "42.00" })),
        );
        let deps = test_deps.server_deps();

        let record = extract_document(&event("data:application/pdf;base64,AAAA", None), &deps)
            .await
            .unwrap();

        let expected = JobRecord::completed(json!({ "extractedData": { "total": "42.00" } }));
        assert_eq!(record, expected);
        assert_eq!(deps.result_store.get("run_test").await.unwrap(), Some(expected));

        let calls = test_deps.completion.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].attachment.media_type, "application/pdf");
        assert_eq!(calls[0].attachment.file_name.as_deref(), Some(DEFAULT_FILE_NAME));
        assert_eq!(calls[0].mode, OutputMode::Json);
    }

    #[tokio::test]
    async fn test_unparsable_output_still_completes_empty() {
        let test_deps = TestDependencies::new()
            .mock_completion(MockCompletion::new().with_response("not json at all"));

        let record = extract_document(
            &event("data:image/png;base64,AAAA", None),
            &test_deps.server_deps(),
        )
        .await
        .unwrap();

        assert_eq!(record, JobRecord::completed(json!({ "extractedData": {} })));
    }

    #[tokio::test]
    async fn test_model_failure_marks_run_failed() {
        let test_deps = TestDependencies::new()
            .mock_completion(MockCompletion::new().with_error("quota exceeded"));

        let record = extract_document(
            &event("data:application/pdf;base64,AAAA", None),
            &test_deps.server_deps(),
        )
        .await
        .unwrap();

        assert_eq!(
            record,
            JobRecord::failed("Extraction model call failed: quota exceeded")
        );
    }

    #[tokio::test]
    async fn test_url_without_content_type_fails_before_model_call() {
        let test_deps = TestDependencies::new();

        let record = extract_document(
            &event("https://example.com/doc.pdf", None),
            &test_deps.server_deps(),
        )
        .await
        .unwrap();

        assert_eq!(
            record,
            JobRecord::failed("contentType is required for URL-based documents")
        );
        assert_eq!(test_deps.completion.call_count(), 0);
    }

    #[tokio::test]
    async fn test_url_with_content_type_passes_url_through() {
        let test_deps = TestDependencies::new();

        extract_document(
            &event("https://example.com/doc.pdf", Some("application/pdf")),
            &test_deps.server_deps(),
        )
        .await
        .unwrap();

        let calls = test_deps.completion.calls();
        assert_eq!(calls[0].attachment.url, "https://example.com/doc.pdf");
        assert_eq!(calls[0].attachment.media_type, "application/pdf");
    }

    #[tokio::test]
    async fn test_redelivery_returns_settled_record_without_model_call() {
        let test_deps = TestDependencies::new().mock_completion(
            MockCompletion::new()
                .with_json_response(json!({ "total": 1 }))
                .with_error("boom"),
        );
        let deps = test_deps.server_deps();
        let uploaded = event("data:application/pdf;base64,AAAA", None);

        let first = extract_document(&uploaded, &deps).await.unwrap();
        let second = extract_document(&uploaded, &deps).await.unwrap();

        let expected = JobRecord::completed(json!({ "extractedData": { "total": 1 } }));
        assert_eq!(first, expected);
        assert_eq!(second, expected);
        assert_eq!(deps.result_store.get("run_test").await.unwrap(), Some(expected));
        assert_eq!(test_deps.completion.call_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_run_is_not_retried_by_redelivery() {
        let test_deps = TestDependencies::new();
        let deps = test_deps.server_deps();
        deps.result_store
            .set("run_test", JobRecord::failed("workflow service unreachable"))
            .await
            .unwrap();

        let record = extract_document(&event("data:application/pdf;base64,AAAA", None), &deps)
            .await
            .unwrap();

        assert_eq!(record, JobRecord::failed("workflow service unreachable"));
        assert_eq!(test_deps.completion.call_count(), 0);
    }

    #[tokio::test]
    async fn test_requested_fields_reach_prompt() {
        let test_deps = TestDependencies::new();
        let mut uploaded = event("data:application/pdf;base64,AAAA", None);
        uploaded.fields = Some(vec!["vendor".into(), "due_date".into()]);

        extract_document(&uploaded, &test_deps.server_deps())
            .await
            .unwrap();

        let calls = test_deps.completion.calls();
        assert!(calls[0].prompt.contains("vendor, due_date"));
    }
}
