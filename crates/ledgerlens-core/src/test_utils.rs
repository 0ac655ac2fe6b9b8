//! Test utilities for ledgerlens-core
//!
//! A mock Ollama server for development and integration tests. It answers
//! `/api/tags`, `/api/generate`, and `/api/embed` with deterministic data.

use axum::{
    extract::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::sync::oneshot;

use crate::retrieval::HashingEmbedder;

/// Text every `/api/generate` response starts with
pub const MOCK_PLAN_PREFIX: &str = "MOCK PLAN";

/// Mock Ollama server for testing and development
pub struct MockOllamaServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockOllamaServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        let app = Router::new()
            .route("/api/tags", get(handle_tags))
            .route("/api/generate", post(handle_generate))
            .route("/api/embed", post(handle_embed));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockOllamaServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Ollama tags endpoint response (health check)
async fn handle_tags() -> Json<TagsResponse> {
    Json(TagsResponse {
        models: vec![
            ModelInfo {
                name: "llama3.2:latest".to_string(),
                modified_at: "2024-01-01T00:00:00Z".to_string(),
                size: 2_000_000_000,
            },
            ModelInfo {
                name: "nomic-embed-text:latest".to_string(),
                modified_at: "2024-01-01T00:00:00Z".to_string(),
                size: 274_000_000,
            },
        ],
    })
}

/// Ollama generate endpoint
///
/// Echoes which report sections reached the model so tests can check the
/// prompt without matching the whole text.
async fn handle_generate(Json(request): Json<GenerateRequest>) -> Json<GenerateResponse> {
    let mut sections = Vec::new();
    for marker in ["FINANCIAL OVERVIEW", "OVERSPENDING", "BUDGETING STRATEGIES"] {
        if request.prompt.contains(marker) {
            sections.push(marker);
        }
    }

    let response = format!(
        "{} (model {}, temperature {})\nsections: {}",
        MOCK_PLAN_PREFIX,
        request.model,
        request.options.map(|o| o.temperature).unwrap_or(0.8),
        sections.join(", ")
    );

    Json(GenerateResponse {
        model: request.model,
        response,
        done: true,
    })
}

/// Ollama embed endpoint, backed by the hashing embedder
async fn handle_embed(Json(request): Json<EmbedRequest>) -> Json<EmbedResponse> {
    let embedder = HashingEmbedder::new(64);
    Json(EmbedResponse {
        model: request.model,
        embeddings: request.input.iter().map(|t| embedder.embed_text(t)).collect(),
    })
}

#[derive(Debug, Serialize)]
struct TagsResponse {
    models: Vec<ModelInfo>,
}

#[derive(Debug, Serialize)]
struct ModelInfo {
    name: String,
    modified_at: String,
    size: u64,
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    options: Option<GenerateOptions>,
}

#[derive(Debug, Deserialize)]
struct GenerateOptions {
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct GenerateResponse {
    model: String,
    response: String,
    done: bool,
}

#[derive(Debug, Deserialize)]
struct EmbedRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Debug, Serialize)]
struct EmbedResponse {
    model: String,
    embeddings: Vec<Vec<f32>>,
}
