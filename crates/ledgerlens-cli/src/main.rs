//! ledgerlens CLI - Personal finance analyzer
//!
//! Usage:
//!   ledgerlens report --file CSV        Totals, recurring charges, overspending
//!   ledgerlens trends --file CSV        Monthly income/expense/savings
//!   ledgerlens strategies "QUERY"       Search budgeting strategies
//!   ledgerlens advise --file CSV        AI-written financial plan

mod cli;
mod commands;


use anyhow::{Context, Result};
use clap::Parser;
use ledgerlens_core::{AIClient, Settings};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;

    match cli.command {
        Commands::Report {
            file,
            json,
            min_occurrences,
            threshold,
            baseline,
        } => {
            let overrides = commands::ReportOverrides {
                min_occurrences,
                threshold,
                baseline,
            };
            commands::cmd_report(&settings, &file, &overrides, json)
        }
        Commands::Trends { file } => commands::cmd_trends(&settings, &file),
        Commands::Strategies { query, top_k } => {
            let ai = AIClient::from_env();
            commands::cmd_strategies(&settings, &query, top_k, ai.as_ref()).await
        }
        Commands::Advise { file, top_k } => {
            commands::cmd_advise(&settings, &file, top_k, AIClient::from_env()).await
        }
        Commands::Config => commands::cmd_config(&settings, cli.config.as_deref()),
    }
}
