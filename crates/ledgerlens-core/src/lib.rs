//! ledgerlens Core Library
//!
//! Shared functionality for the ledgerlens personal finance analyzer:
//! - Ledger loading and the typed transaction table
//! - Financial analytics engine (totals, trends, recurring charges, overspending)
//! - Retrieval over a budgeting-strategy knowledge base
//! - Pluggable local AI backends (Ollama, mock)
//! - Prompt library for customizable AI prompts
//! - Advisor turning a report into a written plan

pub mod advisor;
pub mod ai;
pub mod analytics;
pub mod config;
pub mod error;
pub mod import;
pub mod models;
pub mod prompts;
pub mod retrieval;
pub mod table;

/// Test utilities including mock Ollama server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use advisor::{format_currency, Advice, Advisor};
pub use ai::{AIBackend, AIClient, MockBackend, OllamaBackend};
pub use analytics::{
    AnalysisConfig, BaselineMode, FinancialAnalyzer, MonthKey, OverspendConfig, RecurrenceConfig,
};
pub use config::{AdvisorConfig, EmbedderKind, RetrievalConfig, Settings};
pub use error::{Error, Result};
pub use import::{load_file, parse_csv, LoadStats, RawTable};
pub use models::{
    IntervalLabel, MonthlyTrend, OverspendAlert, RecurringCharge, Report, SavingsPotential, Totals,
    Transaction, TransactionKind,
};
pub use prompts::{Prompt, PromptId, PromptLibrary};
pub use retrieval::{shared_index, Embedder, HashingEmbedder, RetrievalIndex, ScoredPassage};
pub use table::{TableStats, TransactionTable};
