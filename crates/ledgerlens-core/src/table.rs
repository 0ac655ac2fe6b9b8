//! Schema boundary: raw rows in, typed transaction table out
//!
//! Required columns are checked before anything else. Cell-level parse
//! failures never abort the load; they leave the affected field missing.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::import::{parse_amount, parse_date, RawTable};
use crate::models::{Transaction, TransactionKind};

/// Column aliases accepted for each logical field (normalized names)
const DATE_COLUMNS: &[&str] = &["date"];
const AMOUNT_COLUMNS: &[&str] = &["amount"];
const CATEGORY_COLUMNS: &[&str] = &["category"];
const KIND_COLUMNS: &[&str] = &["type", "kind"];
const DESCRIPTION_COLUMNS: &[&str] = &["transaction_description", "description"];

/// Category label that is always treated as an income source
const INCOME_CATEGORY: &str = "other";

/// Counters from building a table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableStats {
    /// Rows dropped because their type was neither income nor expense
    pub skipped_rows: usize,
    /// Rows reclassified as income by the "Other" rule
    pub reclassified_rows: usize,
    pub missing_dates: usize,
    pub missing_amounts: usize,
}

/// Immutable, validated transaction table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionTable {
    transactions: Vec<Transaction>,
    stats: TableStats,
}

impl TransactionTable {
    /// Build a table from already-typed transactions
    ///
    /// Applies the same normalization pass as [`TransactionTable::from_raw`]:
    /// category spelling is unified case-insensitively and "Other" rows
    /// become income.
    pub fn new(transactions: Vec<Transaction>) -> Self {
        let mut stats = TableStats::default();
        let transactions = normalize(transactions, &mut stats);
        Self {
            transactions,
            stats,
        }
    }

    /// Validate a raw table and coerce its cells
    ///
    /// Fails with [`Error::Schema`] if the category, amount, or type column is
    /// absent. `date` and `description` columns are optional; when absent,
    /// every row has those fields missing.
    pub fn from_raw(raw: &RawTable) -> Result<Self> {
        let category_col = resolve(raw, CATEGORY_COLUMNS);
        let amount_col = resolve(raw, AMOUNT_COLUMNS);
        let kind_col = resolve(raw, KIND_COLUMNS);

        let mut missing = Vec::new();
        if category_col.is_none() {
            missing.push("category".to_string());
        }
        if amount_col.is_none() {
            missing.push("amount".to_string());
        }
        if kind_col.is_none() {
            missing.push("type".to_string());
        }
        let (Some(category_col), Some(amount_col), Some(kind_col)) =
            (category_col, amount_col, kind_col)
        else {
            return Err(Error::Schema(missing));
        };

        let date_col = resolve(raw, DATE_COLUMNS);
        let description_col = resolve(raw, DESCRIPTION_COLUMNS);

        let mut stats = TableStats::default();
        let mut transactions = Vec::with_capacity(raw.rows.len());

        for (index, row) in raw.rows.iter().enumerate() {
            let cell = |col: usize| row.get(col).map(|s| s.trim()).unwrap_or("");

            let category = cell(category_col).to_string();
            let kind = if is_income_category(&category) {
                if cell(kind_col).parse::<TransactionKind>() != Ok(TransactionKind::Income) {
                    stats.reclassified_rows += 1;
                }
                TransactionKind::Income
            } else {
                match cell(kind_col).parse::<TransactionKind>() {
                    Ok(kind) => kind,
                    Err(_) => {
                        warn!(
                            row = index + 1,
                            value = cell(kind_col),
                            "Skipping row with unrecognized transaction type"
                        );
                        stats.skipped_rows += 1;
                        continue;
                    }
                }
            };

            let date = date_col.and_then(|col| parse_date(cell(col)));
            if date.is_none() {
                stats.missing_dates += 1;
            }
            let amount = parse_amount(cell(amount_col));
            if amount.is_none() {
                stats.missing_amounts += 1;
            }
            let description = description_col
                .map(|col| cell(col).to_string())
                .filter(|d| !d.is_empty());

            transactions.push(Transaction {
                date,
                amount,
                category,
                kind,
                description,
            });
        }

        let transactions = normalize(transactions, &mut stats);

        debug!(
            rows = transactions.len(),
            skipped = stats.skipped_rows,
            reclassified = stats.reclassified_rows,
            missing_dates = stats.missing_dates,
            missing_amounts = stats.missing_amounts,
            "Built transaction table"
        );

        Ok(Self {
            transactions,
            stats,
        })
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn stats(&self) -> TableStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn income(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter().filter(|t| t.is_income())
    }

    pub fn expenses(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter().filter(|t| t.is_expense())
    }
}

/// Find the first present column among the aliases
fn resolve(raw: &RawTable, aliases: &[&str]) -> Option<usize> {
    aliases.iter().find_map(|name| raw.column(name))
}

fn is_income_category(category: &str) -> bool {
    category.trim().eq_ignore_ascii_case(INCOME_CATEGORY)
}

/// One pass over the rows: trim and unify category spelling, apply the
/// "Other" rule
fn normalize(transactions: Vec<Transaction>, stats: &mut TableStats) -> Vec<Transaction> {
    let mut spellings: HashMap<String, String> = HashMap::new();

    transactions
        .into_iter()
        .map(|mut tx| {
            let trimmed = tx.category.trim().to_string();
            tx.category = spellings
                .entry(trimmed.to_lowercase())
                .or_insert(trimmed)
                .clone();

            if is_income_category(&tx.category) && tx.kind != TransactionKind::Income {
                tx.kind = TransactionKind::Income;
                stats.reclassified_rows += 1;
            }
            tx
        })
        .collect()
}
