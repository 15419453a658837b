//! Ollama backend.
//!
//! Calls `POST {host}/api/generate` with streaming disabled and returns the
//! `response` field.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{http_client, Backend, BackendError, BackendKind, ResponseFormat};
use crate::config::BackendConfig;

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Client for a local or remote Ollama server.
pub struct OllamaBackend {
    http: Client,
    host: String,
    model: String,
}

impl OllamaBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        Ok(Self {
            http: http_client(config)?,
            host: config.host.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl Backend for OllamaBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Ollama
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn response_format(&self) -> ResponseFormat {
        ResponseFormat::Json
    }

    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String, BackendError> {
        let url = format!("{}/api/generate", self.host);
        debug!(%url, model = %self.model, "ollama generate");

        let response = self
            .http
            .post(&url)
            .json(&GenerateRequest {
                model: &self.model,
                prompt,
                stream: false,
                options: GenerateOptions { temperature },
            })
            .send()
            .await
            .map_err(BackendError::from_request)?;

        let status = response.status();
        let body = response.text().await.map_err(BackendError::from_request)?;
        if !status.is_success() {
            return Err(BackendError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| BackendError::InvalidResponse(format!("ollama: {}", e)))?;
        Ok(parsed.response)
    }
}
