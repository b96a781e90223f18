//! Provider implementations

pub mod anthropic;
pub mod gemini;
pub mod openai;

pub use anthropic::AnthropicProvider;
pub use gemini::GeminiProvider;
pub use openai::OpenAIProvider;

use crate::core::config::ProviderCredentials;
use crate::core::provider::{Provider, ProviderError, ProviderType};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Build the HTTP client shared by one provider
pub(crate) fn http_client(timeout: u64) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout))
        .build()
        .map_err(|e| ProviderError::Unexpected(format!("Failed to create HTTP client: {}", e)))
}

/// Create the provider for `provider_type`
pub fn create_provider(
    provider_type: ProviderType,
    credentials: &ProviderCredentials,
    timeout: u64,
) -> Result<Arc<dyn Provider>, ProviderError> {
    let provider: Arc<dyn Provider> = match provider_type {
        ProviderType::OpenAI => Arc::new(OpenAIProvider::new(
            credentials.api_key.clone(),
            credentials.base_url.clone(),
            timeout,
        )?),
        ProviderType::Anthropic => Arc::new(AnthropicProvider::new(
            credentials.api_key.clone(),
            credentials.base_url.clone(),
            timeout,
        )?),
        ProviderType::Gemini => Arc::new(GeminiProvider::new(
            credentials.api_key.clone(),
            credentials.base_url.clone(),
            timeout,
        )?),
    };
    Ok(provider)
}
