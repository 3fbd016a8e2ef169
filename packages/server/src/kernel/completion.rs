//! `BaseCompletion` over the OpenAI chat completions API.
//!
//! Images go to the model as `image_url` parts (remote URL or data URI). Every other
//! media type goes as an inline `file` part, so remote non-image documents are
//! downloaded and base64-encoded first.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use openai_client::{ChatRequest, ContentPart, Message, OpenAIClient};
use tracing::{debug, warn};

use crate::kernel::{BaseCompletion, MediaAttachment, OutputMode};

const DEFAULT_ATTACHMENT_NAME: &str = "document";

pub struct OpenAiCompletion {
    client: OpenAIClient,
    http_client: reqwest::Client,
    model: String,
}

impl OpenAiCompletion {
    pub fn new(client: OpenAIClient, model: impl Into<String>) -> Self {
        Self {
            client,
            http_client: reqwest::Client::new(),
            model: model.into(),
        }
    }

    async fn media_part(&self, attachment: &MediaAttachment) -> Result<ContentPart> {
        if attachment.media_type.starts_with("image/") {
            return Ok(ContentPart::image_url(&attachment.url));
        }

        let data_uri = if attachment.url.starts_with("data:") {
            attachment.url.clone()
        } else {
            self.download_as_data_uri(&attachment.url, &attachment.media_type)
                .await?
        };

        let file_name = attachment
            .file_name
            .clone()
            .unwrap_or_else(|| DEFAULT_ATTACHMENT_NAME.to_string());

        Ok(ContentPart::file(file_name, data_uri))
    }

    async fn download_as_data_uri(&self, url: &str, media_type: &str) -> Result<String> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch document from {}", url))?;

        let status = response.status();
        if !status.is_success() {
            bail!("Failed to fetch document from {} ({})", url, status);
        }

        let bytes = response
            .bytes()
            .await
            .context("Failed to read document body")?;

        debug!(url = %url, bytes = bytes.len(), "Downloaded remote document");

        Ok(format!("data:{};base64,{}", media_type, STANDARD.encode(&bytes)))
    }
}

#[async_trait]
impl BaseCompletion for OpenAiCompletion {
    async fn generate(
        &self,
        prompt: &str,
        attachment: &MediaAttachment,
        mode: OutputMode,
    ) -> Result<String> {
        let media = self.media_part(attachment).await?;

        let mut request = ChatRequest::new(&self.model)
            .message(Message::user_parts(vec![ContentPart::text(prompt), media]));
        if mode == OutputMode::Json {
            request = request.json_mode();
        }

        let response = match self.client.chat_completion(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    model = %self.model,
                    transient = e.is_transient(),
                    error = %e,
                    "Completion request failed"
                );
                return Err(e.into());
            }
        };

        if let Some(usage) = &response.usage {
            debug!(
                model = %self.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Completion finished"
            );
        }

        Ok(response.content)
    }
}
