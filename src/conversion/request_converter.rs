//! Analyze request to chat request conversion
//!
//! Resolves the requested task, renders the analysis prompt, and wraps it in
//! a chat completion request for the chosen model.

use crate::models::analyze::{Language, TaskType};
use crate::models::openai::{OpenAIChatCompletionRequest, OpenAIMessage};

/// Labels shown by the frontend task selector
const TASK_DESCRIPTIONS: &[(&str, TaskType)] = &[
    ("find and fix errors", TaskType::Debug),
    ("find and fix error", TaskType::Debug),
    ("find and fix bugs", TaskType::Debug),
    ("improve structure", TaskType::Refactor),
    ("improve structure and readability", TaskType::Refactor),
    ("full cleanup", TaskType::DebugRefactor),
    ("optimize speed", TaskType::Performance),
    ("optimize performance", TaskType::Performance),
    ("add comments", TaskType::Comments),
    ("document code", TaskType::Comments),
    ("document the code", TaskType::Comments),
];

/// Map a human-friendly task label to a task
///
/// Matching is trimmed and case-insensitive. Task ids pass through.
pub fn map_description_to_task(description: &str) -> Option<TaskType> {
    let key = description.trim().to_lowercase();
    if key.is_empty() {
        return None;
    }

    TaskType::from_id(&key).or_else(|| {
        TASK_DESCRIPTIONS
            .iter()
            .find(|(label, _)| *label == key)
            .map(|(_, task)| *task)
    })
}

/// Pick the task for a request: the explicit id wins over the description
pub fn resolve_task(task: Option<TaskType>, description: Option<&str>) -> Option<TaskType> {
    task.or_else(|| description.and_then(map_description_to_task))
}

fn task_description(task: TaskType) -> &'static str {
    match task {
        TaskType::Debug => "identify and fix bugs, syntax errors, and logical issues",
        TaskType::Refactor => {
            "improve code structure, readability, and maintainability without changing functionality"
        }
        TaskType::DebugRefactor => {
            "first fix any bugs, then improve the code structure and readability"
        }
        TaskType::Performance => {
            "optimize the code for better performance while maintaining correctness"
        }
        TaskType::Comments => "add comprehensive comments and documentation to explain the code",
    }
}

fn task_instructions(task: TaskType) -> &'static str {
    match task {
        TaskType::Debug => {
            "Focus on finding and fixing syntax errors, logical bugs, and runtime issues."
        }
        TaskType::Refactor => {
            "Improve variable names, function structure, and code organization."
        }
        TaskType::DebugRefactor => {
            "First ensure the code works correctly, then make it cleaner and more maintainable."
        }
        TaskType::Performance => {
            "Look for algorithmic improvements, reduce unnecessary operations, and optimize loops."
        }
        TaskType::Comments => {
            "Add JSDoc/docstring comments, inline explanations, and usage examples."
        }
    }
}

/// Render the analysis prompt
pub fn build_prompt(code: &str, task: TaskType, language: Language) -> String {
    format!(
        r#"Act as a senior software engineer with extensive experience in {language} development.

You are helping a junior developer debug and improve their code. Your task is to {description}.

IMPORTANT CONSTRAINTS:
- Keep original function names unless they are clearly wrong
- Do not exceed 50 lines of code in your response
- Provide clear, educational explanations
- Focus on best practices for {language}

CODE TO ANALYZE:
``` {language}
{code}
```

{instructions}

Return your response in the following JSON format:
{{
  "code": "the improved code here",
  "explanations": [
    {{
      "title": "Brief title of the change",
      "description": "Detailed explanation of why this change was made"
    }}
  ]
}}

Ensure the code is properly formatted and functional."#,
        language = language,
        description = task_description(task),
        code = code,
        instructions = task_instructions(task),
    )
}

/// Wrap a prompt in a single-message chat request
pub fn build_chat_request(
    prompt: String,
    model: &str,
    max_tokens: u32,
    temperature: f32,
) -> OpenAIChatCompletionRequest {
    OpenAIChatCompletionRequest {
        model: model.to_string(),
        messages: vec![OpenAIMessage::user(prompt)],
        max_tokens: Some(max_tokens),
        temperature: Some(temperature),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_description_to_task_matches() {
        let cases = [
            ("Find and fix errors", TaskType::Debug),
            (" find and fix errors ", TaskType::Debug),
            ("Improve Structure", TaskType::Refactor),
            ("Full cleanup", TaskType::DebugRefactor),
            ("Optimize Speed", TaskType::Performance),
            ("Add Comments", TaskType::Comments),
            ("document code", TaskType::Comments),
            ("debug", TaskType::Debug),
            ("refactor", TaskType::Refactor),
            ("DEBUG-REFACTOR", TaskType::DebugRefactor),
        ];
        for (input, expected) in cases {
            assert_eq!(map_description_to_task(input), Some(expected), "{input:?}");
        }
    }

    #[test]
    fn test_map_description_to_task_unknown_returns_none() {
        assert_eq!(map_description_to_task(""), None);
        assert_eq!(map_description_to_task("   "), None);
        assert_eq!(map_description_to_task("unknown task"), None);
    }

    #[test]
    fn test_resolve_task_prefers_id() {
        assert_eq!(
            resolve_task(Some(TaskType::Comments), Some("find and fix bugs")),
            Some(TaskType::Comments)
        );
        assert_eq!(
            resolve_task(None, Some("find and fix bugs")),
            Some(TaskType::Debug)
        );
        assert_eq!(resolve_task(None, None), None);
    }

    #[test]
    fn test_build_prompt_contents() {
        let code = "function add(a, b) { return a - b }";
        let prompt = build_prompt(code, TaskType::Debug, Language::TypeScript);

        assert!(prompt.starts_with(
            "Act as a senior software engineer with extensive experience in typescript development."
        ));
        assert!(prompt.contains("Your task is to identify and fix bugs"));
        assert!(prompt.contains(&format!("``` typescript\n{code}\n```")));
        assert!(prompt.contains("Focus on best practices for typescript"));
        assert!(prompt.contains("\"explanations\": ["));
        assert!(prompt.ends_with("Ensure the code is properly formatted and functional."));
    }

    #[test]
    fn test_every_task_has_instructions() {
        for task in TaskType::ALL {
            let prompt = build_prompt("x = 1", task, Language::Python);
            assert!(prompt.contains(task_instructions(task)));
        }
    }

    #[test]
    fn test_build_chat_request() {
        let request = build_chat_request("prompt".to_string(), "gpt-4o", 2000, 0.1);
        assert_eq!(request.model, "gpt-4o");
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, "user");
        assert_eq!(request.max_tokens, Some(2000));
    }
}
