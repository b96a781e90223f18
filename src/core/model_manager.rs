//! Model routing
//!
//! This module maps the model selector sent by clients to a concrete
//! provider and upstream model name.

use crate::core::config::{Config, ModelConfig};
use crate::core::constants::model;
use crate::core::provider::ProviderType;
use crate::models::analyze::AIModel;

/// Provider and upstream model chosen for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRoute {
    pub provider: ProviderType,
    pub model: String,
}

/// Resolves client model selectors against the configuration
pub struct ModelManager {
    models: ModelConfig,
    long_prompt_chars: usize,
    configured: Vec<ProviderType>,
}

impl ModelManager {
    /// Create a new ModelManager with the given configuration
    pub fn new(config: &Config) -> Self {
        Self {
            models: config.models.clone(),
            long_prompt_chars: config.long_prompt_chars,
            configured: config.configured_providers(),
        }
    }

    /// Pick provider and model for a request
    ///
    /// Explicit selectors always resolve, whether or not their provider has a
    /// key. `auto` takes the first configured provider and returns `None`
    /// when there is none. Long prompts get the provider's larger model.
    pub fn route(&self, requested: AIModel, prompt: &str) -> Option<ModelRoute> {
        let (provider, model) = match requested {
            AIModel::Auto => {
                let provider = *self.configured.first()?;
                let long = prompt.chars().count() > self.long_prompt_chars;
                (provider, self.model_for(provider, long).to_string())
            }
            AIModel::GeminiPro => (ProviderType::Gemini, self.models.gemini_big.clone()),
            AIModel::GeminiFlash => (ProviderType::Gemini, self.models.gemini_small.clone()),
            AIModel::Gpt4 => (ProviderType::OpenAI, model::GPT_4.to_string()),
            AIModel::Gpt4o => (ProviderType::OpenAI, model::GPT_4O.to_string()),
            AIModel::Gpt4oMini => (ProviderType::OpenAI, model::GPT_4O_MINI.to_string()),
            AIModel::ClaudeSonnet => (ProviderType::Anthropic, self.models.anthropic_big.clone()),
            AIModel::ClaudeHaiku => (ProviderType::Anthropic, self.models.anthropic_small.clone()),
        };

        Some(ModelRoute { provider, model })
    }

    fn model_for(&self, provider: ProviderType, long: bool) -> &str {
        match (provider, long) {
            (ProviderType::Gemini, true) => &self.models.gemini_big,
            (ProviderType::Gemini, false) => &self.models.gemini_small,
            (ProviderType::OpenAI, true) => &self.models.openai_big,
            (ProviderType::OpenAI, false) => &self.models.openai_small,
            (ProviderType::Anthropic, true) => &self.models.anthropic_big,
            (ProviderType::Anthropic, false) => &self.models.anthropic_small,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::TomlConfig;

    fn create_test_config(openai: bool, gemini: bool) -> Config {
        let mut toml_config = TomlConfig::default();
        if openai {
            toml_config.openai.api_key = Some("sk-test1234567890".to_string());
        }
        if gemini {
            toml_config.gemini.api_key = Some("AIzaTest1234567890".to_string());
        }
        Config::from_toml(toml_config).unwrap()
    }

    #[test]
    fn test_auto_prefers_gemini() {
        let manager = ModelManager::new(&create_test_config(true, true));
        assert_eq!(
            manager.route(AIModel::Auto, "short prompt"),
            Some(ModelRoute {
                provider: ProviderType::Gemini,
                model: "gemini-flash-latest".to_string(),
            })
        );
    }

    #[test]
    fn test_auto_long_prompt_uses_big_model() {
        let manager = ModelManager::new(&create_test_config(true, false));
        let prompt = "x".repeat(2001);
        assert_eq!(
            manager.route(AIModel::Auto, &prompt),
            Some(ModelRoute {
                provider: ProviderType::OpenAI,
                model: "gpt-4o".to_string(),
            })
        );
        let prompt = "x".repeat(2000);
        assert_eq!(
            manager.route(AIModel::Auto, &prompt).map(|r| r.model),
            Some("gpt-4o-mini".to_string())
        );
    }

    #[test]
    fn test_auto_without_providers() {
        let manager = ModelManager::new(&create_test_config(false, false));
        assert_eq!(manager.route(AIModel::Auto, "prompt"), None);
    }

    #[test]
    fn test_explicit_model_routes_without_key() {
        let manager = ModelManager::new(&create_test_config(false, false));
        let route = manager.route(AIModel::ClaudeHaiku, "prompt").unwrap();
        assert_eq!(route.provider, ProviderType::Anthropic);
        assert_eq!(route.model, "claude-haiku-4-5");

        let route = manager.route(AIModel::Gpt4, "prompt").unwrap();
        assert_eq!(route.provider, ProviderType::OpenAI);
        assert_eq!(route.model, "gpt-4");
    }
}
