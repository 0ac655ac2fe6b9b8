//! Pluggable local AI backend abstraction
//!
//! The advisor turns a report into prose through an `AIBackend`; the
//! retrieval index can also embed through one.
//!
//! # Architecture
//!
//! - `AIBackend` trait: text generation, embeddings, health
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OllamaBackend`, `MockBackend`
//!
//! # Usage
//!
//! ```rust,ignore
//! let ai = AIClient::from_env();
//!
//! if let Some(ref client) = ai {
//!     let text = client.generate("You are a coach.", "Summarize my month", 0.2).await?;
//!     println!("{}", text);
//! }
//! ```
//!
//! # Configuration
//!
//! Environment variables:
//! - `AI_BACKEND`: Backend to use (ollama, mock). Default: ollama
//! - `OLLAMA_HOST`: Ollama server URL (required for ollama backend)
//! - `OLLAMA_MODEL`: Generation model name (default: llama3.2)
//! - `OLLAMA_EMBED_MODEL`: Embedding model name (default: nomic-embed-text)

mod mock;
mod ollama;

pub use mock::MockBackend;
pub use ollama::OllamaBackend;

use async_trait::async_trait;

use crate::error::Result;
use crate::retrieval::Embedder;

/// Trait defining the interface for all AI backends
///
/// Backends should be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait AIBackend: Send + Sync {
    /// Generate a completion for `prompt` under the `system` instruction
    async fn generate(&self, system: &str, prompt: &str, temperature: f64) -> Result<String>;

    /// Embed a batch of texts
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Check if the backend is available
    async fn health_check(&self) -> bool;

    /// Get the generation model name
    fn model(&self) -> &str;

    /// Get the embedding model name
    fn embed_model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete AI client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AIClient {
    /// Ollama backend (HTTP API)
    Ollama(OllamaBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AIClient {
    /// Create an AI client from environment variables
    ///
    /// Checks `AI_BACKEND` to determine which backend to use:
    /// - `ollama` (default): Uses OLLAMA_HOST, OLLAMA_MODEL, OLLAMA_EMBED_MODEL
    /// - `mock`: Creates a mock backend for testing
    ///
    /// Returns None if the required environment variables are not set.
    pub fn from_env() -> Option<Self> {
        let backend = std::env::var("AI_BACKEND").unwrap_or_else(|_| "ollama".to_string());

        match backend.to_lowercase().as_str() {
            "ollama" => OllamaBackend::from_env().map(AIClient::Ollama),
            "mock" => Some(AIClient::Mock(MockBackend::new())),
            _ => {
                tracing::warn!(backend = %backend, "Unknown AI_BACKEND, falling back to ollama");
                OllamaBackend::from_env().map(AIClient::Ollama)
            }
        }
    }

    /// Create an Ollama backend directly
    pub fn ollama(host: &str, model: &str) -> Self {
        AIClient::Ollama(OllamaBackend::new(host, model))
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }

    /// Create a new instance with a different generation model
    pub fn with_model(&self, model: &str) -> Self {
        match self {
            AIClient::Ollama(b) => AIClient::Ollama(b.with_model(model)),
            AIClient::Mock(b) => AIClient::Mock(b.with_model(model)),
        }
    }
}

// Implement AIBackend for AIClient by delegating to the inner backend
#[async_trait]
impl AIBackend for AIClient {
    async fn generate(&self, system: &str, prompt: &str, temperature: f64) -> Result<String> {
        match self {
            AIClient::Ollama(b) => b.generate(system, prompt, temperature).await,
            AIClient::Mock(b) => b.generate(system, prompt, temperature).await,
        }
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        match self {
            AIClient::Ollama(b) => AIBackend::embed(b, texts).await,
            AIClient::Mock(b) => AIBackend::embed(b, texts).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::Ollama(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AIClient::Ollama(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    fn embed_model(&self) -> &str {
        match self {
            AIClient::Ollama(b) => b.embed_model(),
            AIClient::Mock(b) => b.embed_model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::Ollama(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }
}

// The retrieval index can embed through whichever backend is configured
#[async_trait]
impl Embedder for AIClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        AIBackend::embed(self, texts).await
    }

    fn name(&self) -> &str {
        self.embed_model()
    }
}
