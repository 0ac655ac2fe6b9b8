//! Advice command implementation

use std::path::Path;

use anyhow::{Context, Result};
use ledgerlens_core::{
    format_currency, shared_index, AIBackend, AIClient, Advisor, FinancialAnalyzer, Settings,
};

use super::{load_table, select_embedder};

/// Analyze a ledger and ask the AI backend for a written plan
pub async fn cmd_advise(
    settings: &Settings,
    file: &Path,
    top_k: Option<usize>,
    ai: Option<AIClient>,
) -> Result<()> {
    let Some(client) = ai else {
        anyhow::bail!(
            "No AI backend configured. Set OLLAMA_HOST (and optionally OLLAMA_MODEL), \
             or AI_BACKEND=mock for a dry run"
        );
    };

    print!("Checking AI backend at {}... ", client.host());
    if client.health_check().await {
        println!("✅ Connected");
    } else {
        println!("❌ Failed");
        anyhow::bail!(
            "AI backend at {} is not reachable. Start it with `ollama serve` and pull {}",
            client.host(),
            client.model()
        );
    }

    let table = load_table(file)?;
    let report = FinancialAnalyzer::new(&table, settings.analysis()).generate_report();

    let embedder = select_embedder(settings, Some(&client))?;
    let index = shared_index(embedder.as_ref())
        .await
        .context("Failed to build the strategy index")?;

    let mut advisor = Advisor::new(client)
        .with_config(settings.advisor)
        .with_top_k(top_k.unwrap_or(settings.retrieval.top_k));

    println!(
        "🤖 Writing a plan with {} (net savings {})...",
        advisor.backend().model(),
        format_currency(report.totals.net)
    );
    let advice = advisor
        .advise(&report, index, embedder.as_ref())
        .await
        .context("Failed to generate advice")?;

    println!();
    println!("📚 Strategies used");
    println!("   ─────────────────────────────────────────────────────────────");
    if advice.strategies.is_empty() {
        println!("   (none)");
    }
    for strategy in &advice.strategies {
        println!("   - {}", strategy);
    }

    println!();
    println!("📝 Financial Plan");
    println!("   ─────────────────────────────────────────────────────────────");
    println!("{}", advice.text);

    Ok(())
}
