//! Application configuration management
//!
//! Configuration is read from an optional TOML file and then overridden by
//! environment variables (a `.env` file is loaded into the environment by
//! `main` before this runs). All values are validated at startup so a
//! misconfigured service fails fast.

use crate::core::constants::{self, model, upstream};
use crate::core::provider::ProviderType;
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Config file read when `CONFIG_PATH` is unset
const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Default server port
const DEFAULT_PORT: u16 = 8000;

/// Default request timeout in seconds
const DEFAULT_REQUEST_TIMEOUT: u64 = 60;

/// Default completion token budget
const DEFAULT_MAX_TOKENS: u32 = 2000;

/// Low temperature keeps the returned code stable between runs
const DEFAULT_TEMPERATURE: f32 = 0.1;

/// Prompts longer than this use the larger model under `auto`
const DEFAULT_LONG_PROMPT_CHARS: usize = 2000;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProviderSection {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Tokio worker threads; unset means one per CPU
    #[serde(default)]
    pub workers: Option<usize>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            workers: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsSection {
    #[serde(default)]
    pub frontend_url: Option<String>,
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsSection {
    fn default() -> Self {
        Self {
            frontend_url: None,
            allowed_origins: default_allowed_origins(),
        }
    }
}

/// Upstream model names per provider
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ModelConfig {
    #[serde(default = "default_gemini_big")]
    pub gemini_big: String,
    #[serde(default = "default_gemini_small")]
    pub gemini_small: String,
    #[serde(default = "default_openai_big")]
    pub openai_big: String,
    #[serde(default = "default_openai_small")]
    pub openai_small: String,
    #[serde(default = "default_anthropic_big")]
    pub anthropic_big: String,
    #[serde(default = "default_anthropic_small")]
    pub anthropic_small: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            gemini_big: default_gemini_big(),
            gemini_small: default_gemini_small(),
            openai_big: default_openai_big(),
            openai_small: default_openai_small(),
            anthropic_big: default_anthropic_big(),
            anthropic_small: default_anthropic_small(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequestSection {
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
    #[serde(default = "default_long_prompt_chars")]
    pub long_prompt_chars: usize,
    /// Answer with a canned analysis when no provider key is configured
    #[serde(default = "default_demo_mode")]
    pub demo_mode: bool,
    /// Provider preference for `auto`
    #[serde(default = "default_auto_providers")]
    pub auto_providers: Vec<String>,
}

impl Default for RequestSection {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            request_timeout: default_request_timeout(),
            long_prompt_chars: default_long_prompt_chars(),
            demo_mode: default_demo_mode(),
            auto_providers: default_auto_providers(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_allowed_origins() -> Vec<String> {
    constants::DEV_ORIGINS.iter().map(|s| s.to_string()).collect()
}

fn default_gemini_big() -> String {
    model::GEMINI_PRO.to_string()
}

fn default_gemini_small() -> String {
    model::GEMINI_FLASH.to_string()
}

fn default_openai_big() -> String {
    model::GPT_4O.to_string()
}

fn default_openai_small() -> String {
    model::GPT_4O_MINI.to_string()
}

fn default_anthropic_big() -> String {
    model::CLAUDE_SONNET.to_string()
}

fn default_anthropic_small() -> String {
    model::CLAUDE_HAIKU.to_string()
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT
}

fn default_long_prompt_chars() -> usize {
    DEFAULT_LONG_PROMPT_CHARS
}

fn default_demo_mode() -> bool {
    true
}

fn default_auto_providers() -> Vec<String> {
    ProviderType::AUTO_ORDER
        .iter()
        .map(|p| p.as_str().to_string())
        .collect()
}

/// Raw shape of the TOML file; every section is optional
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub cors: CorsSection,
    #[serde(default)]
    pub openai: ProviderSection,
    #[serde(default)]
    pub anthropic: ProviderSection,
    #[serde(default)]
    pub gemini: ProviderSection,
    #[serde(default)]
    pub models: ModelConfig,
    #[serde(default)]
    pub request: RequestSection,
}

impl TomlConfig {
    /// Apply environment overrides through `lookup`
    ///
    /// Takes a lookup function instead of reading the process environment so
    /// tests can feed their own variables.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("OPENAI_API_KEY") {
            self.openai.api_key = Some(v);
        }
        if let Some(v) = lookup("OPENAI_BASE_URL") {
            self.openai.base_url = Some(v);
        }
        if let Some(v) = lookup("ANTHROPIC_API_KEY") {
            self.anthropic.api_key = Some(v);
        }
        if let Some(v) = lookup("ANTHROPIC_BASE_URL") {
            self.anthropic.base_url = Some(v);
        }
        if let Some(v) = lookup("GEMINI_API_KEY") {
            self.gemini.api_key = Some(v);
        }
        if let Some(v) = lookup("GEMINI_BASE_URL") {
            self.gemini.base_url = Some(v);
        }
        if let Some(v) = lookup("FRONTEND_URL") {
            self.cors.frontend_url = Some(v);
        }
        if let Some(v) = lookup("HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("PORT") {
            self.server.port = v
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a port number, got {:?}", v))?;
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            self.server.log_level = v;
        }
        if let Some(v) = lookup("WEB_CONCURRENCY") {
            self.server.workers = Some(
                v.trim()
                    .parse()
                    .with_context(|| format!("WEB_CONCURRENCY must be a number, got {:?}", v))?,
            );
        }
        if let Some(v) = lookup("REQUEST_TIMEOUT") {
            self.request.request_timeout = v
                .trim()
                .parse()
                .with_context(|| format!("REQUEST_TIMEOUT must be seconds, got {:?}", v))?;
        }
        if let Some(v) = lookup("AUTO_PROVIDERS") {
            self.request.auto_providers = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        Ok(())
    }
}

/// Key and endpoint of one configured upstream provider
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderCredentials {
    pub api_key: String,
    pub base_url: String,
}

/// Validated application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Logging level
    pub log_level: String,

    /// Runtime worker threads
    pub workers: Option<usize>,

    /// Origins allowed to call the API from a browser
    pub allowed_origins: Vec<String>,

    pub openai: Option<ProviderCredentials>,
    pub anthropic: Option<ProviderCredentials>,
    pub gemini: Option<ProviderCredentials>,

    pub models: ModelConfig,

    /// Completion token budget
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Request timeout in seconds
    pub request_timeout: u64,

    pub long_prompt_chars: usize,
    pub demo_mode: bool,
    pub auto_providers: Vec<ProviderType>,
}

impl Config {
    /// Load configuration from a TOML file without environment overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed, or if a value is
    /// invalid.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_toml(read_toml(path.as_ref())?)
    }

    /// Load configuration from `CONFIG_PATH` (default `config.toml`, may be
    /// absent) and the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_sources(|name| std::env::var(name).ok())
    }

    /// Resolve the config file and overrides through `lookup`
    ///
    /// An explicit `CONFIG_PATH` must exist; the default `config.toml` may not.
    fn from_sources<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut toml_config = match lookup("CONFIG_PATH") {
            Some(config_path) => read_toml(Path::new(&config_path))?,
            None => {
                let path = Path::new(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    read_toml(path)?
                } else {
                    TomlConfig::default()
                }
            }
        };

        toml_config.apply_env(lookup)?;
        Self::from_toml(toml_config)
    }

    /// Validate a raw TOML config
    pub fn from_toml(config: TomlConfig) -> Result<Self> {
        let request = config.request;

        if request.max_tokens == 0 {
            bail!("request.max_tokens must be greater than zero");
        }
        if !(0.0..=2.0).contains(&request.temperature) {
            bail!(
                "request.temperature must be between 0 and 2, got {}",
                request.temperature
            );
        }
        if request.request_timeout == 0 {
            bail!("request.request_timeout must be greater than zero");
        }
        if config.server.workers == Some(0) {
            bail!("server.workers must be greater than zero");
        }

        let mut auto_providers = Vec::new();
        for name in &request.auto_providers {
            let provider = ProviderType::from_str(name).with_context(|| {
                format!(
                    "Invalid provider {:?} in auto_providers. Must be one of: openai, anthropic, gemini",
                    name
                )
            })?;
            if !auto_providers.contains(&provider) {
                auto_providers.push(provider);
            }
        }

        let mut allowed_origins = Vec::new();
        let frontend = config
            .cors
            .frontend_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        for origin in frontend
            .into_iter()
            .chain(config.cors.allowed_origins.iter().map(String::as_str))
        {
            let origin = origin.trim_end_matches('/');
            if !(origin.starts_with("http://") || origin.starts_with("https://")) {
                bail!("CORS origin must start with http:// or https://, got {:?}", origin);
            }
            if !allowed_origins.iter().any(|o: &String| o == origin) {
                allowed_origins.push(origin.to_string());
            }
        }

        Ok(Config {
            host: config.server.host,
            port: config.server.port,
            log_level: config.server.log_level,
            workers: config.server.workers,
            allowed_origins,
            openai: credentials(config.openai, upstream::OPENAI_BASE_URL),
            anthropic: credentials(config.anthropic, upstream::ANTHROPIC_BASE_URL),
            gemini: credentials(config.gemini, upstream::GEMINI_BASE_URL),
            models: config.models,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            request_timeout: request.request_timeout,
            long_prompt_chars: request.long_prompt_chars,
            demo_mode: request.demo_mode,
            auto_providers,
        })
    }

    /// Credentials of a provider, if its key is configured
    pub fn credentials(&self, provider: ProviderType) -> Option<&ProviderCredentials> {
        match provider {
            ProviderType::OpenAI => self.openai.as_ref(),
            ProviderType::Anthropic => self.anthropic.as_ref(),
            ProviderType::Gemini => self.gemini.as_ref(),
        }
    }

    /// Providers with a usable key, in `auto` preference order
    pub fn configured_providers(&self) -> Vec<ProviderType> {
        let mut providers: Vec<ProviderType> = self
            .auto_providers
            .iter()
            .copied()
            .filter(|p| self.credentials(*p).is_some())
            .collect();
        for provider in ProviderType::AUTO_ORDER {
            if self.credentials(provider).is_some() && !providers.contains(&provider) {
                providers.push(provider);
            }
        }
        providers
    }
}

fn read_toml(path: &Path) -> Result<TomlConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
    toml::from_str(&content).context("Failed to parse TOML configuration")
}

/// Keep a provider only when it has a real key
fn credentials(section: ProviderSection, default_base_url: &str) -> Option<ProviderCredentials> {
    let api_key = section
        .api_key
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty() && !k.starts_with(constants::PLACEHOLDER_KEY_PREFIX))?;

    let base_url = section
        .base_url
        .map(|u| u.trim().trim_end_matches('/').to_string())
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| default_base_url.to_string());

    Some(ProviderCredentials { api_key, base_url })
}

/// Mask an API key for logging: `abcd...wxyz`, or `****` when short
pub fn mask_key(key: &str) -> String {
    let key = key.trim();
    if key.is_empty() {
        return "<none>".to_string();
    }
    if key.chars().count() <= 8 {
        return "****".to_string();
    }
    let head: String = key.chars().take(4).collect();
    let tail: String = key
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("{}...{}", head, tail)
}
