//! Constants shared across the service
//!
//! Message roles, provider defaults, and the fixed texts returned when no
//! model output is available.

/// Message role constants
pub mod role {
    /// User role identifier
    pub const USER: &str = "user";

    /// Assistant role identifier
    pub const ASSISTANT: &str = "assistant";

    /// Gemini's name for the assistant role
    pub const MODEL: &str = "model";
}

/// Upstream API defaults
pub mod upstream {
    /// OpenAI API base URL
    pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

    /// Anthropic API base URL
    pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";

    /// Anthropic API version header value
    pub const ANTHROPIC_VERSION: &str = "2023-06-01";

    /// Google Generative Language API base URL
    pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
}

/// Default upstream model names
pub mod model {
    pub const GEMINI_PRO: &str = "gemini-pro-latest";
    pub const GEMINI_FLASH: &str = "gemini-flash-latest";
    pub const GPT_4: &str = "gpt-4";
    pub const GPT_4O: &str = "gpt-4o";
    pub const GPT_4O_MINI: &str = "gpt-4o-mini";
    pub const CLAUDE_SONNET: &str = "claude-sonnet-4-5";
    pub const CLAUDE_HAIKU: &str = "claude-haiku-4-5";
}

/// Origins of the local frontend dev servers
pub const DEV_ORIGINS: [&str; 3] = [
    "http://localhost:8080",
    "http://localhost:5173",
    "http://localhost:3000",
];

/// Prefix of placeholder keys copied from `.env.example`
pub const PLACEHOLDER_KEY_PREFIX: &str = "your_";

/// Texts of the canned responses
pub mod canned {
    pub const MOCK_CODE_HEADER: &str = "// Mock analysis for anonymous user\n";
    pub const MOCK_TITLE: &str = "Mock Analysis";
    pub const MOCK_DESCRIPTION: &str = "This is a demonstration analysis. Configure an AI provider key to get real AI-powered code analysis.";

    pub const PARSE_ERROR_CODE_HEADER: &str = "// Error parsing AI response\n";
    pub const PARSE_ERROR_TITLE: &str = "AI Response Error";
    pub const PARSE_ERROR_DESCRIPTION: &str = "Could not parse the AI response as JSON. Please check model output or prompt formatting.";
}
