//! Text-generation backends.
//!
//! Provides async clients that turn a prompt into a completion:
//! - Ollama (local models, JSON-shaped completions expected)
//! - Gemini (Google Generative Language API, free-form advice)
//!
//! Backends are selected by [`BackendKind`] through [`create_backend`].
//! Requests are never retried here.

mod gemini;
mod ollama;
mod response;

pub use gemini::GeminiBackend;
pub use ollama::OllamaBackend;
pub use response::{
    parse_response, parse_structured, strip_code_fence, truncate_chars, AiSuggestion,
    StructuredSuggestion, FALLBACK_CHARS,
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::BackendConfig;

/// Errors that can occur while calling a backend.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("request timed out")]
    Timeout,
    #[error("backend returned HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("invalid backend response: {0}")]
    InvalidResponse(String),
    #[error("missing API key (set {0})")]
    MissingApiKey(&'static str),
    #[error("unknown backend: {0}")]
    UnknownBackend(String),
    #[error("request cancelled")]
    Cancelled,
    #[error("no backend configured")]
    NotConfigured,
}

impl BackendError {
    /// Classify a reqwest failure.
    pub(crate) fn from_request(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            BackendError::Timeout
        } else {
            BackendError::Network(e)
        }
    }
}

/// The kind of backend to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Ollama,
    #[serde(alias = "google")]
    Gemini,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Ollama => "ollama",
            BackendKind::Gemini => "gemini",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(BackendKind::Ollama),
            "gemini" | "google" => Ok(BackendKind::Gemini),
            _ => Err(format!("unknown backend {:?}, expected ollama or gemini", s)),
        }
    }
}

/// Shape a backend's completions are expected to take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    /// A JSON object, possibly fenced; prose is tolerated and degraded.
    Json,
    /// Free-form advisory text, kept as-is.
    Text,
}

/// A text-generation backend.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Which backend this is.
    fn kind(&self) -> BackendKind;

    /// Model identifier sent with each request.
    fn model(&self) -> &str;

    /// How completions from this backend should be parsed.
    fn response_format(&self) -> ResponseFormat;

    /// Generate a completion for `prompt`.
    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String, BackendError>;
}

/// Build the backend named by `config.kind`.
pub fn create_backend(config: &BackendConfig) -> Result<Box<dyn Backend>, BackendError> {
    let backend: Box<dyn Backend> = match config.kind {
        BackendKind::Ollama => Box::new(OllamaBackend::new(config)?),
        BackendKind::Gemini => Box::new(GeminiBackend::new(config)?),
    };
    Ok(backend)
}

/// Shared HTTP client setup.
pub(crate) fn http_client(config: &BackendConfig) -> Result<reqwest::Client, BackendError> {
    reqwest::Client::builder()
        .user_agent(concat!("gocodeai/", env!("CARGO_PKG_VERSION")))
        .timeout(config.timeout)
        .build()
        .map_err(BackendError::Network)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_kind_from_str() {
        assert_eq!("ollama".parse::<BackendKind>(), Ok(BackendKind::Ollama));
        assert_eq!("Gemini".parse::<BackendKind>(), Ok(BackendKind::Gemini));
        assert_eq!("google".parse::<BackendKind>(), Ok(BackendKind::Gemini));
        assert!("openai".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_factory_selects_backend() {
        let backend = create_backend(&BackendConfig::defaults(BackendKind::Ollama)).unwrap();
        assert_eq!(backend.kind(), BackendKind::Ollama);
        assert_eq!(backend.response_format(), ResponseFormat::Json);

        let mut gemini = BackendConfig::defaults(BackendKind::Gemini);
        gemini.api_key = "key".into();
        let backend = create_backend(&gemini).unwrap();
        assert_eq!(backend.kind(), BackendKind::Gemini);
        assert_eq!(backend.model(), "gemini-2.5-flash");
        assert_eq!(backend.response_format(), ResponseFormat::Text);
    }

    #[test]
    fn test_gemini_requires_key() {
        let err = create_backend(&BackendConfig::defaults(BackendKind::Gemini))
            .err()
            .unwrap();
        assert!(matches!(err, BackendError::MissingApiKey(_)));
    }
}
