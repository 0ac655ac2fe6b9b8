//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (load_table, select_embedder)
//! - `report` - Analysis commands (report, trends)
//! - `strategies` - Knowledge-base search
//! - `advise` - AI-written financial plan
//! - `config` - Effective settings

pub mod advise;
pub mod config;
pub mod core;
pub mod report;
pub mod strategies;

// Re-export command functions for main.rs
pub use advise::*;
pub use config::*;
pub use core::*;
pub use report::*;
pub use strategies::*;

/// Truncate a string to a maximum length in characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
