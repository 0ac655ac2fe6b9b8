//! Ollama backend implementation
//!
//! HTTP client for the Ollama API: `/api/generate` for advice text,
//! `/api/embed` for retrieval vectors, `/api/tags` for health.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

use super::AIBackend;

const DEFAULT_MODEL: &str = "llama3.2";
const DEFAULT_EMBED_MODEL: &str = "nomic-embed-text";

/// Ollama backend
#[derive(Clone)]
pub struct OllamaBackend {
    http_client: Client,
    base_url: String,
    model: String,
    embed_model: String,
}

impl OllamaBackend {
    /// Create a new Ollama backend
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            embed_model: DEFAULT_EMBED_MODEL.to_string(),
        }
    }

    /// Create a new instance with a different generation model
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            model: model.to_string(),
            ..self.clone()
        }
    }

    /// Create a new instance with a different embedding model
    pub fn with_embed_model(&self, embed_model: &str) -> Self {
        Self {
            embed_model: embed_model.to_string(),
            ..self.clone()
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("OLLAMA_HOST").ok()?;
        let model = std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let backend = Self::new(&host, &model);
        Some(match std::env::var("OLLAMA_EMBED_MODEL") {
            Ok(embed_model) => backend.with_embed_model(&embed_model),
            Err(_) => backend,
        })
    }
}

/// Request to Ollama generate API
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    system: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f64,
}

/// Response from Ollama generate API
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Request to Ollama embed API
#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

/// Response from Ollama embed API
#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[async_trait]
impl AIBackend for OllamaBackend {
    async fn generate(&self, system: &str, prompt: &str, temperature: f64) -> Result<String> {
        let request = GenerateRequest {
            model: &self.model,
            system,
            prompt,
            stream: false,
            options: GenerateOptions { temperature },
        };

        let response = self
            .http_client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let ollama_response: GenerateResponse = response.json().await?;
        debug!(
            model = %self.model,
            chars = ollama_response.response.len(),
            "Ollama generate response"
        );

        let text = ollama_response.response.trim();
        if text.is_empty() {
            return Err(Error::Ai(format!("{} returned an empty response", self.model)));
        }
        Ok(text.to_string())
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbedRequest {
            model: &self.embed_model,
            input: texts,
        };

        let response = self
            .http_client
            .post(format!("{}/api/embed", self.base_url))
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let embed_response: EmbedResponse = response.json().await?;
        if embed_response.embeddings.len() != texts.len() {
            return Err(Error::Ai(format!(
                "{} returned {} embeddings for {} inputs",
                self.embed_model,
                embed_response.embeddings.len(),
                texts.len()
            )));
        }
        debug!(
            model = %self.embed_model,
            count = texts.len(),
            "Ollama embed response"
        );
        Ok(embed_response.embeddings)
    }

    async fn health_check(&self) -> bool {
        match self
            .http_client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn embed_model(&self) -> &str {
        &self.embed_model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let backend = OllamaBackend::new("http://localhost:11434/", "llama3.2");
        assert_eq!(backend.host(), "http://localhost:11434");
        assert_eq!(backend.embed_model(), DEFAULT_EMBED_MODEL);
    }

    #[test]
    fn test_generate_request_shape() {
        let request = GenerateRequest {
            model: "llama3.2",
            system: "sys",
            prompt: "hi",
            stream: false,
            options: GenerateOptions { temperature: 0.2 },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["temperature"], 0.2);
        assert_eq!(json["system"], "sys");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_unhealthy() {
        let backend = OllamaBackend::new("http://127.0.0.1:1", "llama3.2");
        assert!(!backend.health_check().await);
    }

    #[tokio::test]
    async fn test_embed_empty_input_skips_request() {
        let backend = OllamaBackend::new("http://127.0.0.1:1", "llama3.2");
        assert!(backend.embed(&[]).await.unwrap().is_empty());
    }
}
