//! Retrieval over the budgeting-strategy knowledge base
//!
//! The corpus is embedded once into a [`RetrievalIndex`]; queries are ranked
//! by cosine similarity. [`shared_index`] keeps one index per process,
//! built on first use.
//!
//! # Architecture
//!
//! - `Embedder` trait: turns text into vectors
//! - `HashingEmbedder`: local default
//! - `AIClient` (see [`crate::ai`]) embeds through the AI backend

pub mod corpus;
mod embedding;

pub use corpus::BUDGET_GUIDELINES;
pub use embedding::HashingEmbedder;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Anything that can turn text into fixed-length vectors
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, one vector per text, in order
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Identifier recorded on the index (vectors from different embedders
    /// are not comparable)
    fn name(&self) -> &str;
}

/// A ranked passage
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredPassage {
    /// Position in the corpus
    pub index: usize,
    pub text: String,
    pub score: f32,
}

/// Embedded corpus, immutable once built
#[derive(Debug, Clone)]
pub struct RetrievalIndex {
    passages: Vec<String>,
    vectors: Vec<Vec<f32>>,
    embedder: String,
}

impl RetrievalIndex {
    /// Embed every passage of `corpus`
    pub async fn build<E, S>(embedder: &E, corpus: &[S]) -> Result<Self>
    where
        E: Embedder + ?Sized,
        S: AsRef<str>,
    {
        let passages: Vec<String> = corpus.iter().map(|s| s.as_ref().to_string()).collect();
        let vectors = embedder.embed(&passages).await?;

        if vectors.len() != passages.len() {
            return Err(Error::InvalidData(format!(
                "Embedder returned {} vectors for {} passages",
                vectors.len(),
                passages.len()
            )));
        }

        info!(
            passages = passages.len(),
            embedder = embedder.name(),
            "Indexed strategy corpus"
        );
        Ok(Self {
            passages,
            vectors,
            embedder: embedder.name().to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    /// Name of the embedder the index was built with
    pub fn embedder(&self) -> &str {
        &self.embedder
    }

    /// Up to `k` passages with scores, best first
    ///
    /// Equal scores keep corpus order. `k == 0` returns nothing without
    /// calling the embedder.
    pub async fn search<E>(&self, embedder: &E, query: &str, k: usize) -> Result<Vec<ScoredPassage>>
    where
        E: Embedder + ?Sized,
    {
        if k == 0 || self.passages.is_empty() {
            return Ok(Vec::new());
        }

        let query_vector = embedder
            .embed(&[query.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::InvalidData("Embedder returned no query vector".into()))?;

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(index, vector)| {
                if vector.len() != query_vector.len() {
                    return Err(Error::InvalidData(format!(
                        "Query vector has {} dimensions, index has {}",
                        query_vector.len(),
                        vector.len()
                    )));
                }
                Ok((index, cosine_similarity(&query_vector, vector)))
            })
            .collect::<Result<_>>()?;

        // Stable sort: ties stay in corpus order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        debug!(query = %query, hits = scored.len(), "Retrieved strategies");
        Ok(scored
            .into_iter()
            .map(|(index, score)| ScoredPassage {
                index,
                text: self.passages[index].clone(),
                score,
            })
            .collect())
    }

    /// Up to `k` passage texts, best first
    pub async fn retrieve<E>(&self, embedder: &E, query: &str, k: usize) -> Result<Vec<String>>
    where
        E: Embedder + ?Sized,
    {
        Ok(self
            .search(embedder, query, k)
            .await?
            .into_iter()
            .map(|p| p.text)
            .collect())
    }
}

/// Cosine similarity; 0 when either vector has zero length
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

static SHARED_INDEX: OnceCell<RetrievalIndex> = OnceCell::const_new();

/// The process-wide index over [`BUDGET_GUIDELINES`]
///
/// Built with `embedder` on the first call; later calls reuse it. Passing
/// a different embedder afterwards is an error, since its vectors would not
/// be comparable.
pub async fn shared_index<E>(embedder: &E) -> Result<&'static RetrievalIndex>
where
    E: Embedder + ?Sized,
{
    let index = SHARED_INDEX
        .get_or_try_init(|| RetrievalIndex::build(embedder, BUDGET_GUIDELINES))
        .await?;

    if index.embedder() != embedder.name() {
        return Err(Error::InvalidData(format!(
            "Shared index was built with the {} embedder, not {}",
            index.embedder(),
            embedder.name()
        )));
    }
    Ok(index)
}
