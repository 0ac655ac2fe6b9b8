//! Knowledge-base search command

use anyhow::{Context, Result};
use ledgerlens_core::{shared_index, AIClient, Settings};

use super::select_embedder;

/// Print the strategies closest to `query`
pub async fn cmd_strategies(
    settings: &Settings,
    query: &str,
    top_k: Option<usize>,
    ai: Option<&AIClient>,
) -> Result<()> {
    let embedder = select_embedder(settings, ai)?;
    let index = shared_index(embedder.as_ref())
        .await
        .context("Failed to build the strategy index")?;

    let k = top_k.unwrap_or(settings.retrieval.top_k);
    let hits = index.search(embedder.as_ref(), query, k).await?;

    println!();
    println!("📚 Strategies for \"{}\"", query);
    println!("   ─────────────────────────────────────────────────────────────");

    if hits.is_empty() {
        println!("   No strategies found.");
        return Ok(());
    }

    for (rank, hit) in hits.iter().enumerate() {
        println!("   {}. [{:.3}] {}", rank + 1, hit.score, hit.text);
    }

    Ok(())
}
