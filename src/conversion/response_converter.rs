//! Model output to analysis conversion
//!
//! Models wrap the requested JSON in prose or code fences, or put braces
//! inside the returned code, so the result object is searched for rather
//! than parsed directly.

use crate::core::constants::canned;
use crate::models::analyze::{AnalyzeResponse, Explanation};
use crate::models::openai::OpenAIChatCompletionResponse;
use tracing::debug;

/// Text of the first choice of a completion
pub fn completion_text(response: &OpenAIChatCompletionResponse) -> &str {
    response
        .choices
        .first()
        .and_then(|choice| choice.message.content.as_deref())
        .unwrap_or("")
}

fn try_parse(segment: &str) -> Option<AnalyzeResponse> {
    serde_json::from_str(segment).ok()
}

/// Extract an analysis from free-form model output
///
/// Tries, in order: the whole text, every balanced `{...}` segment from left
/// to right, then the span from the first `{` to the last `}`. When nothing
/// parses, the raw output is returned inside an error analysis.
pub fn parse_analysis(content: &str) -> AnalyzeResponse {
    if let Some(parsed) = try_parse(content) {
        return parsed;
    }

    let bytes = content.as_bytes();
    for (start, _) in content.match_indices('{') {
        let mut depth = 0usize;
        for (offset, &b) in bytes[start..].iter().enumerate() {
            match b {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        let end = start + offset + 1;
                        if let Some(parsed) = try_parse(&content[start..end]) {
                            return parsed;
                        }
                        break;
                    }
                }
                _ => {}
            }
        }
    }

    if let (Some(start), Some(end)) = (content.find('{'), content.rfind('}')) {
        if end > start {
            if let Some(parsed) = try_parse(&content[start..=end]) {
                return parsed;
            }
        }
    }

    debug!("AI response could not be parsed as JSON; returning error wrapper");
    parse_error_analysis(content)
}

/// Analysis returned when the model output holds no usable JSON
pub fn parse_error_analysis(content: &str) -> AnalyzeResponse {
    AnalyzeResponse {
        code: format!("{}{}", canned::PARSE_ERROR_CODE_HEADER, content),
        explanations: vec![Explanation::new(
            canned::PARSE_ERROR_TITLE,
            canned::PARSE_ERROR_DESCRIPTION,
        )],
    }
}

/// Demonstration analysis used when no provider is configured
pub fn demo_analysis(code: &str) -> AnalyzeResponse {
    AnalyzeResponse {
        code: format!("{}{}", canned::MOCK_CODE_HEADER, code),
        explanations: vec![Explanation::new(
            canned::MOCK_TITLE,
            canned::MOCK_DESCRIPTION,
        )],
    }
}
