// Main entry point for the DocuFlow API server

use std::sync::Arc;

use anyhow::{Context, Result};
use openai_client::OpenAIClient;
use server_core::kernel::{
    BaseDispatcher, BaseResultStore, ExtractionRunner, InMemoryResultStore, InProcessDispatcher,
    OpenAiCompletion, ServerDeps, WorkflowEventClient,
};
use server_core::{server::build_app, Config};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Capacity of the in-process event queue
const EVENT_QUEUE_CAPACITY: usize = 256;

/// Event key used when the workflow service URL is set without one
const DEFAULT_WORKFLOW_EVENT_KEY: &str = "local";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting DocuFlow API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(model = %config.extraction_model, "Configuration loaded");

    let mut openai = OpenAIClient::new(config.openai_api_key.clone());
    if let Some(base_url) = &config.openai_base_url {
        openai = openai.with_base_url(base_url);
    }
    let completion = Arc::new(OpenAiCompletion::new(openai, config.extraction_model.clone()));
    let result_store = Arc::new(InMemoryResultStore::new());
    let shutdown = CancellationToken::new();

    // Dispatch through the workflow service when configured, otherwise in-process
    let server_deps = match &config.workflow_event_url {
        Some(url) => {
            let key = config
                .workflow_event_key
                .clone()
                .unwrap_or_else(|| DEFAULT_WORKFLOW_EVENT_KEY.to_string());
            tracing::info!(url = %url, "Dispatching to external workflow service");

            let dispatcher: Arc<dyn BaseDispatcher> = Arc::new(WorkflowEventClient::new(url, key));
            Arc::new(ServerDeps::new(result_store.clone(), dispatcher, completion))
        }
        None => {
            tracing::info!("Dispatching to in-process extraction runner");

            let (dispatcher, events) = InProcessDispatcher::channel(EVENT_QUEUE_CAPACITY);
            let deps = Arc::new(ServerDeps::new(
                result_store.clone(),
                Arc::new(dispatcher),
                completion,
            ));
            let runner = ExtractionRunner::new(events, deps.clone(), shutdown.clone());
            tokio::spawn(runner.run());
            deps
        }
    };

    let app = build_app(server_deps, config.max_upload_bytes);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    let signal = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => tracing::info!("Shutdown signal received"),
                _ = signal.cancelled() => {}
            }
            signal.cancel();
        })
        .await
        .context("Server error")?;

    // Results are process-scoped; drop them explicitly on the way out
    result_store.clear().await?;
    tracing::info!("Server stopped");

    Ok(())
}
