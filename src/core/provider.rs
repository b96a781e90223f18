//! Provider abstraction layer for different LLM API providers
//!
//! This module defines a common trait for the upstream providers (OpenAI,
//! Anthropic, Gemini). Every provider accepts an OpenAI-shaped chat request
//! and answers with an OpenAI-shaped completion.

use crate::models::openai::{OpenAIChatCompletionRequest, OpenAIChatCompletionResponse};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Error types for provider operations
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl ProviderError {
    /// Classify a non-success upstream status and its body
    ///
    /// Some providers report rejected keys as 400 and exhausted quota as 403,
    /// so the body is consulted before the status.
    pub fn from_status(status: u16, body: &str) -> Self {
        let lower = body.to_lowercase();

        if lower.contains("api key not valid")
            || lower.contains("api_key_invalid")
            || lower.contains("invalid_api_key")
            || lower.contains("leaked")
        {
            return ProviderError::Authentication(body.to_string());
        }

        if lower.contains("quota") || lower.contains("resource_exhausted") {
            return ProviderError::RateLimit(body.to_string());
        }

        match status {
            401 | 403 => ProviderError::Authentication(body.to_string()),
            429 => ProviderError::RateLimit(body.to_string()),
            400 => ProviderError::BadRequest(body.to_string()),
            _ => ProviderError::ApiError {
                status,
                message: body.to_string(),
            },
        }
    }

    /// Rewrite the message while keeping the classification
    pub fn map_message<F>(self, f: F) -> Self
    where
        F: FnOnce(&str) -> String,
    {
        match self {
            ProviderError::Authentication(m) => ProviderError::Authentication(f(&m)),
            ProviderError::RateLimit(m) => ProviderError::RateLimit(f(&m)),
            ProviderError::BadRequest(m) => ProviderError::BadRequest(f(&m)),
            ProviderError::ApiError { status, message } => ProviderError::ApiError {
                status,
                message: f(&message),
            },
            ProviderError::Unexpected(m) => ProviderError::Unexpected(f(&m)),
        }
    }
}

/// Trait for LLM API providers
#[async_trait]
pub trait Provider: Send + Sync {
    /// Send a non-streaming chat completion request
    async fn create_chat_completion(
        &self,
        request: &OpenAIChatCompletionRequest,
    ) -> Result<OpenAIChatCompletionResponse, ProviderError>;

    /// Get the provider name
    fn provider_name(&self) -> &str;
}

/// Supported provider types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderType {
    OpenAI,
    Anthropic,
    Gemini,
}

impl ProviderType {
    /// Preference order used when the client asks for `auto`
    pub const AUTO_ORDER: [ProviderType; 3] = [
        ProviderType::Gemini,
        ProviderType::OpenAI,
        ProviderType::Anthropic,
    ];

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Some(ProviderType::OpenAI),
            "anthropic" | "claude" => Some(ProviderType::Anthropic),
            "gemini" | "google" => Some(ProviderType::Gemini),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderType::OpenAI => "openai",
            ProviderType::Anthropic => "anthropic",
            ProviderType::Gemini => "gemini",
        }
    }

    /// Name used in client-facing messages
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderType::OpenAI => "OpenAI",
            ProviderType::Anthropic => "Anthropic",
            ProviderType::Gemini => "Gemini",
        }
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_by_code() {
        assert!(matches!(
            ProviderError::from_status(401, "nope"),
            ProviderError::Authentication(_)
        ));
        assert!(matches!(
            ProviderError::from_status(429, "slow down"),
            ProviderError::RateLimit(_)
        ));
        assert!(matches!(
            ProviderError::from_status(400, "bad json"),
            ProviderError::BadRequest(_)
        ));
        assert!(matches!(
            ProviderError::from_status(500, "boom"),
            ProviderError::ApiError { status: 500, .. }
        ));
    }

    #[test]
    fn test_from_status_by_body() {
        assert!(matches!(
            ProviderError::from_status(400, "API key not valid. Please pass a valid API key."),
            ProviderError::Authentication(_)
        ));
        assert!(matches!(
            ProviderError::from_status(403, "You exceeded your current quota"),
            ProviderError::RateLimit(_)
        ));
        assert!(matches!(
            ProviderError::from_status(403, "Your API key was reported as leaked"),
            ProviderError::Authentication(_)
        ));
    }

    #[test]
    fn test_provider_type_from_str() {
        assert_eq!(ProviderType::from_str("OpenAI"), Some(ProviderType::OpenAI));
        assert_eq!(ProviderType::from_str("claude"), Some(ProviderType::Anthropic));
        assert_eq!(ProviderType::from_str("gemini"), Some(ProviderType::Gemini));
        assert_eq!(ProviderType::from_str("vertexai"), None);
    }
}
