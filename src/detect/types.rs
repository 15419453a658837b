//! Core types for detection results.

use serde::{Deserialize, Serialize};

/// Finding kinds. Serialized names are stable and appear in JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FindingKind {
    #[serde(rename = "missing_comment")]
    MissingComment,
    #[serde(rename = "too_many_params")]
    TooManyParams,
    #[serde(rename = "unused_var")]
    UnusedVar,
    #[serde(rename = "unhandled_error")]
    UnhandledError,
    /// Synthetic kind recording a failed AI stage.
    #[serde(rename = "ai_error")]
    AiError,
}

impl FindingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingKind::MissingComment => "missing_comment",
            FindingKind::TooManyParams => "too_many_params",
            FindingKind::UnusedVar => "unused_var",
            FindingKind::UnhandledError => "unhandled_error",
            FindingKind::AiError => "ai_error",
        }
    }
}

impl std::fmt::Display for FindingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single detected issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub kind: FindingKind,
    /// `file:line:column`, or `-` when there is no source location.
    pub pos: String,
    pub message: String,
}

impl Finding {
    pub fn new(kind: FindingKind, pos: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            pos: pos.into(),
            message: message.into(),
        }
    }

    /// Finding recording an AI-stage failure for a function.
    pub fn ai_error(message: impl Into<String>) -> Self {
        Self::new(FindingKind::AiError, "-", message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_serialized_name() {
        for kind in [
            FindingKind::MissingComment,
            FindingKind::TooManyParams,
            FindingKind::UnusedVar,
            FindingKind::UnhandledError,
            FindingKind::AiError,
        ] {
            assert_eq!(serde_json::to_value(kind).unwrap(), kind.to_string());
        }
    }

    #[test]
    fn test_finding_json_shape() {
        let f = Finding::new(FindingKind::UnusedVar, "a.go:4:2", "possibly unused variable: x");
        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(json["kind"], "unused_var");
        assert_eq!(json["pos"], "a.go:4:2");
        assert_eq!(Finding::ai_error("boom").pos, "-");
    }
}
