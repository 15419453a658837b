//! Gemini backend (Google Generative Language API).
//!
//! Calls `POST {base}/{model}:generateContent` and joins the text parts of
//! the first candidate.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{http_client, Backend, BackendError, BackendKind, ResponseFormat};
use crate::config::{BackendConfig, ENV_GOOGLE_API_KEY};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// Client for the Gemini `generateContent` endpoint.
pub struct GeminiBackend {
    http: Client,
    base_url: String,
    model: String,
    api_key: String,
    max_tokens: u32,
}

impl GeminiBackend {
    /// Fails with `MissingApiKey` when no key is configured.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        if config.api_key.is_empty() {
            return Err(BackendError::MissingApiKey(ENV_GOOGLE_API_KEY));
        }
        Ok(Self {
            http: http_client(config)?,
            base_url: config.host.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl Backend for GeminiBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Gemini
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn response_format(&self) -> ResponseFormat {
        ResponseFormat::Text
    }

    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String, BackendError> {
        let url = format!("{}/{}:generateContent", self.base_url, self.model);
        debug!(model = %self.model, "gemini generateContent");

        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": temperature,
                "maxOutputTokens": self.max_tokens,
            },
        });

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(BackendError::from_request)?;

        let status = response.status();
        let text = response.text().await.map_err(BackendError::from_request)?;
        if !status.is_success() {
            return Err(BackendError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&text)
            .map_err(|e| BackendError::InvalidResponse(format!("gemini: {}", e)))?;

        let Some(content) = parsed.candidates.into_iter().find_map(|c| c.content) else {
            let reason = parsed
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no candidates".to_string());
            return Err(BackendError::InvalidResponse(format!("gemini: {}", reason)));
        };

        Ok(content
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect::<Vec<_>>()
            .join(""))
    }
}
