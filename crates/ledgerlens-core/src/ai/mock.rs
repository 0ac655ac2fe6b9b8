//! Mock backend for testing
//!
//! Predictable generation and local hashing embeddings, for unit tests and
//! development without a running LLM server.

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::retrieval::HashingEmbedder;

use super::AIBackend;

/// Mock AI backend for testing
#[derive(Clone, Default)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    /// Fixed text returned by `generate` (None echoes a summary of the prompt)
    pub response: Option<String>,
    embedder: HashingEmbedder,
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self {
            healthy: true,
            ..Default::default()
        }
    }

    /// Create an unhealthy mock backend
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            ..Default::default()
        }
    }

    /// Always answer `generate` with `response`
    pub fn with_response(response: &str) -> Self {
        Self {
            healthy: true,
            response: Some(response.to_string()),
            ..Default::default()
        }
    }

    /// Create a new instance with a different model (no-op for mock)
    pub fn with_model(&self, _model: &str) -> Self {
        self.clone()
    }
}

#[async_trait]
impl AIBackend for MockBackend {
    async fn generate(&self, system: &str, prompt: &str, _temperature: f64) -> Result<String> {
        if !self.healthy {
            return Err(Error::Ai("mock backend is unhealthy".into()));
        }
        if let Some(ref response) = self.response {
            return Ok(response.clone());
        }

        let first_line = prompt.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
        Ok(format!(
            "Mock financial plan ({} system chars, {} prompt lines)\n{}",
            system.len(),
            prompt.lines().count(),
            first_line.trim()
        ))
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embedder.embed_text(t)).collect())
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn embed_model(&self) -> &str {
        "mock-embed"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_health_check() {
        let healthy = MockBackend::new();
        assert!(healthy.health_check().await);

        let unhealthy = MockBackend::unhealthy();
        assert!(!unhealthy.health_check().await);
    }

    #[tokio::test]
    async fn test_mock_generate_fixed_response() {
        let mock = MockBackend::with_response("Cut dining by half.");
        let text = mock.generate("system", "prompt", 0.2).await.unwrap();
        assert_eq!(text, "Cut dining by half.");
    }

    #[tokio::test]
    async fn test_mock_generate_echoes_prompt() {
        let mock = MockBackend::new();
        let text = mock
            .generate("coach", "\n### Overview\nmore", 0.2)
            .await
            .unwrap();
        assert!(text.contains("### Overview"));
    }

    #[tokio::test]
    async fn test_unhealthy_mock_fails_generate() {
        let mock = MockBackend::unhealthy();
        assert!(matches!(
            mock.generate("s", "p", 0.2).await,
            Err(Error::Ai(_))
        ));
    }

    #[tokio::test]
    async fn test_mock_embed_deterministic() {
        let mock = MockBackend::new();
        let texts = vec!["budget".to_string()];
        assert_eq!(mock.embed(&texts).await.unwrap(), mock.embed(&texts).await.unwrap());
    }
}
