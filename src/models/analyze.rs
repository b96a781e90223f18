//! Public API data models
//!
//! Request and response bodies for the `/analyze` endpoint.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of work requested from the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskType {
    Debug,
    Refactor,
    DebugRefactor,
    Performance,
    Comments,
}

impl TaskType {
    pub const ALL: [TaskType; 5] = [
        TaskType::Debug,
        TaskType::Refactor,
        TaskType::DebugRefactor,
        TaskType::Performance,
        TaskType::Comments,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Debug => "debug",
            TaskType::Refactor => "refactor",
            TaskType::DebugRefactor => "debug-refactor",
            TaskType::Performance => "performance",
            TaskType::Comments => "comments",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|task| task.as_str() == id)
    }
}

/// Source language of the submitted code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    JavaScript,
    TypeScript,
    Python,
    Php,
    Html,
    Css,
    Java,
    CSharp,
    Go,
    Rust,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Python => "python",
            Language::Php => "php",
            Language::Html => "html",
            Language::Css => "css",
            Language::Java => "java",
            Language::CSharp => "csharp",
            Language::Go => "go",
            Language::Rust => "rust",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Model selector accepted from clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AIModel {
    #[default]
    #[serde(rename = "auto")]
    Auto,
    #[serde(rename = "gemini-pro-latest")]
    GeminiPro,
    #[serde(rename = "gemini-flash-latest")]
    GeminiFlash,
    #[serde(rename = "gpt-4")]
    Gpt4,
    #[serde(rename = "gpt-4o")]
    Gpt4o,
    #[serde(rename = "gpt-4o-mini")]
    Gpt4oMini,
    #[serde(rename = "claude-sonnet")]
    ClaudeSonnet,
    #[serde(rename = "claude-haiku")]
    ClaudeHaiku,
}

/// Body of `POST /analyze`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub code: String,
    /// Task id; takes precedence over `task_description`
    #[serde(default)]
    pub task: Option<TaskType>,
    /// Human-friendly task label sent by the frontend selector
    #[serde(default)]
    pub task_description: Option<String>,
    #[serde(default)]
    pub model: AIModel,
    #[serde(default)]
    pub language: Language,
}

/// One titled note about a change made to the code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub title: String,
    pub description: String,
}

impl Explanation {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Analysis result returned to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub code: String,
    pub explanations: Vec<Explanation>,
}
