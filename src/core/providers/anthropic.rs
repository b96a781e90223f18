//! Anthropic provider implementation

use crate::core::constants::{role, upstream};
use crate::core::provider::{Provider, ProviderError};
use crate::core::providers::http_client;
use crate::models::anthropic::{
    AnthropicMessage, AnthropicMessagesRequest, AnthropicMessagesResponse,
};
use crate::models::openai::{
    OpenAIChatCompletionRequest, OpenAIChatCompletionResponse, OpenAIChoice, OpenAIMessage,
    OpenAIUsage,
};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

/// Anthropic requires `max_tokens`; used when the request has none
const FALLBACK_MAX_TOKENS: u32 = 2000;

/// Anthropic Messages API provider
pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider
    ///
    /// * `base_url` - API root without the `/v1` suffix
    pub fn new(api_key: String, base_url: String, timeout: u64) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(timeout)?,
            api_key,
            base_url,
        })
    }

    /// Convert the chat request to Anthropic format
    ///
    /// System messages are lifted into the top-level `system` field.
    fn convert_request(request: &OpenAIChatCompletionRequest) -> AnthropicMessagesRequest {
        let mut system_parts = Vec::new();
        let mut messages = Vec::new();

        for msg in &request.messages {
            let Some(content) = msg.content.clone() else {
                continue;
            };
            if msg.role == "system" {
                system_parts.push(content);
            } else {
                let role = if msg.role == role::ASSISTANT {
                    role::ASSISTANT
                } else {
                    role::USER
                };
                messages.push(AnthropicMessage {
                    role: role.to_string(),
                    content,
                });
            }
        }

        AnthropicMessagesRequest {
            model: request.model.clone(),
            max_tokens: request.max_tokens.unwrap_or(FALLBACK_MAX_TOKENS),
            messages,
            system: (!system_parts.is_empty()).then(|| system_parts.join("\n\n")),
            temperature: request.temperature,
        }
    }

    /// Convert an Anthropic response to OpenAI format
    fn convert_response(
        response: AnthropicMessagesResponse,
        model: &str,
    ) -> OpenAIChatCompletionResponse {
        let finish_reason = match response.stop_reason.as_deref() {
            Some("max_tokens") => "length",
            _ => "stop",
        };
        let usage = &response.usage;

        OpenAIChatCompletionResponse {
            id: response.id.clone(),
            model: model.to_string(),
            choices: vec![OpenAIChoice {
                index: 0,
                message: OpenAIMessage {
                    role: role::ASSISTANT.to_string(),
                    content: Some(response.text()),
                },
                finish_reason: Some(finish_reason.to_string()),
            }],
            usage: Some(OpenAIUsage {
                prompt_tokens: usage.input_tokens,
                completion_tokens: usage.output_tokens,
                total_tokens: usage.input_tokens.saturating_add(usage.output_tokens),
            }),
        }
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    async fn create_chat_completion(
        &self,
        request: &OpenAIChatCompletionRequest,
    ) -> Result<OpenAIChatCompletionResponse, ProviderError> {
        let url = format!("{}/v1/messages", self.base_url);
        let body = Self::convert_request(request);
        debug!("POST {} model={}", url, body.model);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", upstream::ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Unexpected(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::from_status(status.as_u16(), &error_text));
        }

        let message: AnthropicMessagesResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Unexpected(format!("Failed to parse response: {}", e)))?;

        Ok(Self::convert_response(message, &request.model))
    }

    fn provider_name(&self) -> &str {
        "Anthropic"
    }
}
