//! Shared utilities for commands
//!
//! This module contains:
//! - `load_table` - Load a ledger file and validate its schema
//! - `select_embedder` - Pick the embedder named in the settings

use std::path::Path;

use anyhow::{Context, Result};
use ledgerlens_core::{
    load_file, AIClient, Embedder, EmbedderKind, HashingEmbedder, Settings, TransactionTable,
};
use tracing::{info, warn};

/// Load a ledger and build the validated transaction table
pub fn load_table(file: &Path) -> Result<TransactionTable> {
    let raw = load_file(file).with_context(|| format!("Failed to load {}", file.display()))?;
    let table = TransactionTable::from_raw(&raw)
        .with_context(|| format!("{} is not a usable ledger", file.display()))?;

    let stats = table.stats();
    if stats.skipped_rows > 0 {
        warn!(
            skipped = stats.skipped_rows,
            "Some rows had an unrecognized type and were skipped"
        );
    }
    info!(
        transactions = table.len(),
        duplicates = raw.stats.duplicates_removed,
        missing_dates = stats.missing_dates,
        missing_amounts = stats.missing_amounts,
        "Ledger ready"
    );

    Ok(table)
}

/// Build the embedder the settings ask for
///
/// The `ai` embedder needs a configured backend; the hashing embedder never
/// does.
pub fn select_embedder(settings: &Settings, ai: Option<&AIClient>) -> Result<Box<dyn Embedder>> {
    match settings.retrieval.embedder {
        EmbedderKind::Hashing => Ok(Box::new(HashingEmbedder::new(
            settings.retrieval.dimensions,
        ))),
        EmbedderKind::Ai => {
            let client = ai.context(
                "retrieval.embedder = \"ai\" needs an AI backend. Set OLLAMA_HOST (or AI_BACKEND=mock)",
            )?;
            Ok(Box::new(client.clone()))
        }
    }
}
