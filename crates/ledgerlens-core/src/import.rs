//! Ledger file loading
//!
//! Reads a CSV ledger into a [`RawTable`]: column names normalized to
//! lower-case snake case, exact duplicate rows removed. Typing of the cells
//! happens later, at the schema boundary (see [`crate::table`]).

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, Trim};
use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::{Error, Result};

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Untyped tabular data straight from the source file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    /// Normalized column names
    pub headers: Vec<String>,
    /// Cell text per row, aligned with `headers` (short rows padded with "")
    pub rows: Vec<Vec<String>>,
    pub stats: LoadStats,
}

impl RawTable {
    /// Position of a column by its normalized name
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Counters from a load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub rows_read: usize,
    pub duplicates_removed: usize,
}

/// Supported source formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
}

impl SourceFormat {
    /// Detect the format from a file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            "" => Err(Error::UnsupportedFormat(format!(
                "{} has no file extension",
                path.display()
            ))),
            other => Err(Error::UnsupportedFormat(format!(".{}", other))),
        }
    }
}

/// Load a ledger file from disk
pub fn load_file(path: &Path) -> Result<RawTable> {
    if !path.exists() {
        return Err(Error::Load(format!("File not found: {}", path.display())));
    }

    let format = SourceFormat::from_path(path)?;
    let file = File::open(path)
        .map_err(|e| Error::Load(format!("Unable to open {}: {}", path.display(), e)))?;

    let table = match format {
        SourceFormat::Csv => parse_csv(file)?,
    };

    info!(
        path = %path.display(),
        rows = table.rows.len(),
        duplicates = table.stats.duplicates_removed,
        "Loaded ledger"
    );
    Ok(table)
}

/// Parse CSV data into a raw table
pub fn parse_csv<R: Read>(reader: R) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(normalize_column_name).collect();

    let mut seen = HashSet::new();
    let mut rows = Vec::new();
    let mut stats = LoadStats::default();

    for result in rdr.records() {
        let record = result?;
        stats.rows_read += 1;

        let mut row: Vec<String> = record.iter().map(|s| s.to_string()).collect();
        row.resize(headers.len(), String::new());

        let digest = row_digest(&row);
        if !seen.insert(digest.clone()) {
            debug!(digest = %digest, "Dropping duplicate row");
            stats.duplicates_removed += 1;
            continue;
        }
        rows.push(row);
    }

    debug!(
        "Parsed {} rows ({} duplicates removed)",
        stats.rows_read, stats.duplicates_removed
    );
    Ok(RawTable {
        headers,
        rows,
        stats,
    })
}

/// Standardize a column name: trim, lowercase, whitespace runs to `_`
pub fn normalize_column_name(name: &str) -> String {
    WHITESPACE
        .replace_all(name.trim().to_lowercase().as_str(), "_")
        .into_owned()
}

/// SHA-256 digest of a row's cells, used to spot exact duplicates
fn row_digest(cells: &[String]) -> String {
    let mut hasher = Sha256::new();
    for cell in cells {
        hasher.update(cell.as_bytes());
        // Unit separator so ["ab", "c"] and ["a", "bc"] differ
        hasher.update([0x1f]);
    }
    hex::encode(hasher.finalize())
}

/// Parse a date string in various common formats
///
/// Returns `None` when no format matches. A trailing time of day is accepted
/// and discarded.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let formats = [
        "%Y-%m-%d", // 2024-01-15
        "%m/%d/%Y", // 01/15/2024
        "%m/%d/%y", // 01/15/24
        "%m-%d-%Y", // 01-15-2024
        "%d/%m/%Y", // 15/01/2024 (European)
        "%Y/%m/%d", // 2024/01/15
    ];

    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }

    let datetime_formats = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M"];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    None
}

/// Parse an amount string, handling currency symbols and commas
///
/// Returns `None` for empty, unparseable, or non-finite values.
pub fn parse_amount(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .replace(['$', ',', ' '], "")
        .replace('(', "-")
        .replace(')', "");

    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
