//! Gemini provider implementation
//!
//! Talks to the Google Generative Language API with an API key.

use crate::core::constants::role;
use crate::core::provider::{Provider, ProviderError};
use crate::core::providers::http_client;
use crate::models::openai::{
    OpenAIChatCompletionRequest, OpenAIChatCompletionResponse, OpenAIChoice, OpenAIMessage,
    OpenAIUsage,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Gemini provider for Google's generateContent API
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

impl GeminiProvider {
    /// Create a new Gemini provider
    ///
    /// # Arguments
    ///
    /// * `api_key` - Google AI Studio API key
    /// * `base_url` - API root, e.g. `https://generativelanguage.googleapis.com`
    /// * `timeout` - Request timeout in seconds
    pub fn new(api_key: String, base_url: String, timeout: u64) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(timeout)?,
            api_key,
            base_url,
        })
    }

    /// Convert the chat request to Gemini format
    fn convert_request(request: &OpenAIChatCompletionRequest) -> GeminiRequest {
        let mut contents = Vec::new();
        let mut system_parts = Vec::new();

        for msg in &request.messages {
            let Some(ref text) = msg.content else {
                continue;
            };
            let part = GeminiPart {
                text: Some(text.clone()),
            };
            match msg.role.as_str() {
                "system" => system_parts.push(part),
                r if r == role::ASSISTANT => contents.push(GeminiContent {
                    role: Some(role::MODEL.to_string()),
                    parts: vec![part],
                }),
                _ => contents.push(GeminiContent {
                    role: Some(role::USER.to_string()),
                    parts: vec![part],
                }),
            }
        }

        GeminiRequest {
            contents,
            system_instruction: (!system_parts.is_empty()).then(|| GeminiContent {
                role: None,
                parts: system_parts,
            }),
            generation_config: Some(GeminiGenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            }),
        }
    }

    /// Convert a Gemini response to OpenAI format
    fn convert_response(
        response: GeminiResponse,
        model: &str,
    ) -> Result<OpenAIChatCompletionResponse, ProviderError> {
        let candidate = response.candidates.into_iter().next().ok_or_else(|| {
            ProviderError::Unexpected("Gemini returned no candidates".to_string())
        })?;

        let content = candidate
            .content
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let finish_reason = match candidate.finish_reason.as_deref() {
            Some("MAX_TOKENS") => "length",
            Some("SAFETY") | Some("RECITATION") | Some("BLOCKLIST") => "content_filter",
            _ => "stop",
        };
        if finish_reason == "content_filter" {
            warn!("Gemini stopped generation: {:?}", candidate.finish_reason);
        }

        Ok(OpenAIChatCompletionResponse {
            id: String::new(),
            model: model.to_string(),
            choices: vec![OpenAIChoice {
                index: 0,
                message: OpenAIMessage {
                    role: role::ASSISTANT.to_string(),
                    content: Some(content),
                },
                finish_reason: Some(finish_reason.to_string()),
            }],
            usage: response.usage_metadata.map(|u| OpenAIUsage {
                prompt_tokens: u.prompt_token_count,
                completion_tokens: u.candidates_token_count,
                total_tokens: u.total_token_count,
            }),
        })
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    async fn create_chat_completion(
        &self,
        request: &OpenAIChatCompletionRequest,
    ) -> Result<OpenAIChatCompletionResponse, ProviderError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, request.model
        );
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::convert_request(request))
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

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Unexpected(format!("Failed to parse response: {}", e)))?;

        Self::convert_response(gemini_response, &request.model)
    }

    fn provider_name(&self) -> &str {
        "Gemini"
    }
}
