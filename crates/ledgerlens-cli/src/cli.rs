//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// ledgerlens - See where your money goes, and what to do about it
#[derive(Parser)]
#[command(name = "ledgerlens")]
#[command(about = "Personal finance analyzer and budgeting advisor", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Settings file (TOML)
    ///
    /// Without this flag the data-dir override is used when present,
    /// otherwise the built-in defaults.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a ledger: totals, recurring charges, overspending, savings
    Report {
        /// Ledger file (CSV)
        #[arg(short, long)]
        file: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Occurrences needed before a charge counts as recurring
        #[arg(long)]
        min_occurrences: Option<usize>,

        /// Flag a category when latest-month spend exceeds average * threshold
        #[arg(long)]
        threshold: Option<f64>,

        /// Overspending baseline: all-months, prior-months
        #[arg(long)]
        baseline: Option<String>,
    },

    /// Show monthly income, expense, and savings
    Trends {
        /// Ledger file (CSV)
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Search the budgeting-strategy knowledge base
    Strategies {
        /// What you want help with
        query: String,

        /// Number of strategies to show
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Generate a written financial plan with the configured AI backend
    ///
    /// Requires OLLAMA_HOST (or AI_BACKEND=mock for a dry run).
    Advise {
        /// Ledger file (CSV)
        #[arg(short, long)]
        file: PathBuf,

        /// Number of strategies given to the model
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Print the effective settings as TOML
    Config,
}
