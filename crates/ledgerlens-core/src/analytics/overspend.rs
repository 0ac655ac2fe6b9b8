//! Latest-month overspending detection
//!
//! Each category's spend in the latest month present anywhere in the expense
//! data is compared against that category's historical monthly average.
//! The average is taken over months where the category has recorded spend;
//! months without spend do not count as zero.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::OverspendAlert;
use crate::table::TransactionTable;

use super::months::{mean, MonthKey};

/// Which months feed the historical average
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineMode {
    /// Every month with spend, including the latest one
    #[default]
    AllMonths,
    /// Only months before the latest one
    PriorMonths,
}

impl BaselineMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AllMonths => "all_months",
            Self::PriorMonths => "prior_months",
        }
    }
}

impl std::str::FromStr for BaselineMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "all_months" | "all" => Ok(Self::AllMonths),
            "prior_months" | "prior" => Ok(Self::PriorMonths),
            _ => Err(format!(
                "Unknown baseline mode: {} (expected all-months or prior-months)",
                s
            )),
        }
    }
}

impl std::fmt::Display for BaselineMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Overspending thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverspendConfig {
    /// A category is flagged when latest spend > average * threshold_factor
    pub threshold_factor: f64,
    pub baseline: BaselineMode,
}

impl Default for OverspendConfig {
    fn default() -> Self {
        Self {
            threshold_factor: 1.2,
            baseline: BaselineMode::AllMonths,
        }
    }
}

/// The latest month with a dated expense, if any
pub fn latest_expense_month(table: &TransactionTable) -> Option<MonthKey> {
    table
        .expenses()
        .filter_map(|t| t.date)
        .map(MonthKey::of)
        .max()
}

/// Per (category, month) expense totals over dated rows with an amount
fn category_month_spend(table: &TransactionTable) -> BTreeMap<String, BTreeMap<MonthKey, f64>> {
    let mut spend: BTreeMap<String, BTreeMap<MonthKey, f64>> = BTreeMap::new();
    for tx in table.expenses() {
        let (Some(date), Some(amount)) = (tx.date, tx.amount) else {
            continue;
        };
        *spend
            .entry(tx.category.clone())
            .or_default()
            .entry(MonthKey::of(date))
            .or_insert(0.0) += amount;
    }
    spend
}

/// Flag categories whose latest-month spend exceeds their baseline
///
/// An empty expense set yields an empty map. A zero or negative average
/// (refund-heavy categories) reports `pct_over` as 100.
pub fn check_overspending(
    table: &TransactionTable,
    config: &OverspendConfig,
) -> BTreeMap<String, OverspendAlert> {
    let mut alerts = BTreeMap::new();
    let Some(latest) = latest_expense_month(table) else {
        return alerts;
    };

    for (category, months) in category_month_spend(table) {
        let Some(&current) = months.get(&latest) else {
            continue;
        };

        let history: Vec<f64> = months
            .iter()
            .filter(|(month, _)| match config.baseline {
                BaselineMode::AllMonths => true,
                BaselineMode::PriorMonths => **month < latest,
            })
            .map(|(_, total)| *total)
            .collect();
        let average = mean(&history);

        if current > average * config.threshold_factor {
            let pct_over = if average > 0.0 {
                (current - average) / average * 100.0
            } else {
                100.0
            };
            debug!(
                category = %category,
                current,
                average,
                pct_over,
                "Overspending detected"
            );
            alerts.insert(
                category,
                OverspendAlert {
                    current,
                    average,
                    pct_over,
                },
            );
        }
    }

    alerts
}
