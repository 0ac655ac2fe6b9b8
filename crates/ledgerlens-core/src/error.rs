//! Error types for ledgerlens

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Schema error: missing required column(s): {}", .0.join(", "))]
    Schema(Vec<String>),

    #[error("Load error: {0}")]
    Load(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("AI backend error: {0}")]
    Ai(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, Error>;
