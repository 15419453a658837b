//! Parsing of backend completions into suggestions.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ResponseFormat;

/// Characters of raw text kept when a structured parse fails.
pub const FALLBACK_CHARS: usize = 300;

/// Review suggestions decoded from a JSON completion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredSuggestion {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub summary: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment_suggestion: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub better_var_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub improvements: Vec<String>,
}

/// What the model said about a function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AiSuggestion {
    /// The completion decoded into structured fields.
    Structured(StructuredSuggestion),
    /// Free text: a raw-text backend's advice, or the head of a completion
    /// that failed to decode (`truncated` is then set when text was cut).
    Raw {
        output: String,
        #[serde(skip_serializing_if = "std::ops::Not::not")]
        truncated: bool,
    },
}

/// Remove a fenced code block wrapper, if the trimmed text starts with one.
///
/// The opening fence line is dropped; the last line is dropped too when it
/// is a closing fence.
pub fn strip_code_fence(text: &str) -> String {
    let s = text.trim();
    if !s.starts_with("```") {
        return s.to_string();
    }
    let mut lines: Vec<&str> = s.split('\n').collect();
    if lines.len() < 2 {
        return s.to_string();
    }
    lines.remove(0);
    if lines.last().is_some_and(|l| l.trim().starts_with("```")) {
        lines.pop();
    }
    lines.join("\n")
}

/// Decode a completion as a JSON object, tolerating a code fence.
pub fn parse_structured(text: &str) -> Option<StructuredSuggestion> {
    let body = strip_code_fence(text);
    let value: serde_json::Value = serde_json::from_str(&body).ok()?;
    if !value.is_object() {
        return None;
    }
    serde_json::from_value(value).ok()
}

/// First `n` characters of `s`, and whether anything was cut.
pub fn truncate_chars(s: &str, n: usize) -> (String, bool) {
    match s.char_indices().nth(n) {
        Some((idx, _)) => (s[..idx].to_string(), true),
        None => (s.to_string(), false),
    }
}

/// Turn a completion into a suggestion. Never fails.
pub fn parse_response(raw: &str, format: ResponseFormat) -> AiSuggestion {
    match format {
        ResponseFormat::Text => AiSuggestion::Raw {
            output: raw.trim().to_string(),
            truncated: false,
        },
        ResponseFormat::Json => match parse_structured(raw) {
            Some(s) => AiSuggestion::Structured(s),
            None => {
                debug!("completion is not a JSON object, keeping raw text");
                let (output, truncated) = truncate_chars(raw, FALLBACK_CHARS);
                AiSuggestion::Raw { output, truncated }
            }
        },
    }
}
