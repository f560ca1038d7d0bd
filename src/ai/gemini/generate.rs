use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentRequest, GenerateContentResponse, InlineData, Part};
use crate::ai::{Capability, GenerationService, InputItem};
use crate::config::Config;
use crate::{Error, Result};
use async_trait::async_trait;
use base64::Engine as _;
use std::time::Duration;

/// Upstream model ID per capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelection {
    pub text: String,
    pub multimodal: String,
}

impl ModelSelection {
    pub fn model_for(&self, capability: Capability) -> &str {
        match capability {
            Capability::Text => &self.text,
            Capability::Multimodal => &self.multimodal,
        }
    }
}

pub struct GeminiGenerationClient {
    http: GeminiHttpClient,
    models: ModelSelection,
}

impl GeminiGenerationClient {
    pub fn new(api_key: String, models: ModelSelection, timeout: Duration) -> Self {
        Self::new_with_client(api_key, models, timeout, reqwest::Client::new())
    }

    pub fn new_with_client(
        api_key: String,
        models: ModelSelection,
        timeout: Duration,
        client: reqwest::Client,
    ) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(api_key, timeout, client),
            models,
        }
    }

    pub fn from_config(config: &Config, client: reqwest::Client) -> Self {
        Self::new_with_client(
            config.gemini_api_key.clone(),
            ModelSelection {
                text: config.chat_model.clone(),
                multimodal: config.multimodal_model.clone(),
            },
            config.upstream_timeout,
            client,
        )
        .with_base_url(config.gemini_base_url.clone())
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    pub fn models(&self) -> &ModelSelection {
        &self.models
    }

    /// Everything goes into a single user turn, preserving input order.
    fn build_request(inputs: &[InputItem]) -> GenerateContentRequest {
        let parts = inputs
            .iter()
            .map(|item| match item {
                InputItem::Text(text) => Part::Text { text: text.clone() },
                InputItem::Image { mime_type, bytes } => Part::InlineData {
                    inline_data: InlineData {
                        mime_type: mime_type.clone(),
                        data: base64::engine::general_purpose::STANDARD.encode(bytes),
                    },
                },
            })
            .collect();

        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
        }
    }

    fn extract_text(response: &GenerateContentResponse) -> Result<String> {
        if let Some(text) = response.text() {
            return Ok(text);
        }

        let reason = response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.clone())
            .or_else(|| {
                response
                    .candidates
                    .first()
                    .and_then(|c| c.finish_reason.clone())
            });

        Err(Error::AiProvider(match reason {
            Some(reason) => format!("No text in Gemini response (reason: {})", reason),
            None => "No text in Gemini response".to_string(),
        }))
    }
}

#[async_trait]
impl GenerationService for GeminiGenerationClient {
    async fn generate(&self, capability: Capability, inputs: &[InputItem]) -> Result<String> {
        let model = self.models.model_for(capability);
        tracing::debug!(
            "Sending {} request to Gemini (model: {}, {} input(s), {} image(s))",
            capability,
            model,
            inputs.len(),
            inputs.iter().filter(|i| i.is_image()).count()
        );

        let request = Self::build_request(inputs);
        let response: GenerateContentResponse = self.http.generate_content(model, &request).await?;

        Self::extract_text(&response)
    }
}
