//! Domain models for ledgerlens

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analytics::months::MonthKey;

/// Income or expense classification of a ledger row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::Expense => "Expense",
        }
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One ledger entry after schema validation
///
/// `date` and `amount` are `None` when the source cell could not be parsed.
/// Rows with a missing amount are excluded from sums; rows with a missing
/// date are excluded from month-bucketed analyses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: Option<NaiveDate>,
    pub amount: Option<f64>,
    pub category: String,
    pub kind: TransactionKind,
    pub description: Option<String>,
}

impl Transaction {
    pub fn new(
        date: NaiveDate,
        amount: f64,
        category: &str,
        kind: TransactionKind,
        description: &str,
    ) -> Self {
        Self {
            date: Some(date),
            amount: Some(amount),
            category: category.to_string(),
            kind,
            description: Some(description.to_string()),
        }
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }
}

/// Table-wide totals
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Totals {
    #[serde(rename = "Total Income")]
    pub income: f64,
    #[serde(rename = "Total Expenses")]
    pub expenses: f64,
    #[serde(rename = "Net Savings")]
    pub net: f64,
}

/// One row of the monthly trend series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTrend {
    #[serde(rename = "Month")]
    pub month: MonthKey,
    #[serde(rename = "Income")]
    pub income: f64,
    #[serde(rename = "Expense")]
    pub expense: f64,
    #[serde(rename = "Savings")]
    pub savings: f64,
}

/// Estimated cadence of a recurring charge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntervalLabel {
    Monthly,
    Irregular,
}

impl IntervalLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "Monthly",
            Self::Irregular => "Irregular",
        }
    }
}

impl std::fmt::Display for IntervalLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A description + rounded-amount group that met the occurrence threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringCharge {
    pub description: String,
    /// Amount rounded to the nearest whole unit (ties to even)
    pub amount: f64,
    /// Number of occurrences in the group
    pub frequency: usize,
    pub estimated_interval: IntervalLabel,
    /// Mean gap between consecutive dated occurrences, if at least two are dated
    pub mean_interval_days: Option<f64>,
}

/// Latest-month overspending for one category
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverspendAlert {
    pub current: f64,
    pub average: f64,
    pub pct_over: f64,
}

/// Net savings plus the waste that overspending represents
///
/// `potential` adds a lifetime net-savings total to a single-month waste
/// figure. Callers wanting a per-month number divide `net_savings` by the
/// count of active months themselves.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SavingsPotential {
    #[serde(rename = "Current Net Savings")]
    pub net_savings: f64,
    #[serde(rename = "Recoverable Waste (Overspending)")]
    pub recoverable_waste: f64,
    #[serde(rename = "Potential Monthly Savings")]
    pub potential: f64,
}

/// The analytics engine's output value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    #[serde(rename = "Totals")]
    pub totals: Totals,
    #[serde(rename = "Monthly Average Savings")]
    pub monthly_average_savings: f64,
    #[serde(rename = "Recurrent Charges")]
    pub recurrent_charges: Vec<RecurringCharge>,
    #[serde(rename = "Overspending Alerts (Latest Month)")]
    pub overspending_alerts: BTreeMap<String, OverspendAlert>,
    #[serde(rename = "Category Totals")]
    pub category_totals: BTreeMap<String, f64>,
    #[serde(rename = "Monthly Trends")]
    pub monthly_trends: Vec<MonthlyTrend>,
    #[serde(rename = "Savings Potential")]
    pub savings_potential: SavingsPotential,
    #[serde(rename = "Latest Month")]
    pub latest_month: Option<MonthKey>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_str() {
        assert_eq!(
            "income".parse::<TransactionKind>().unwrap(),
            TransactionKind::Income
        );
        assert_eq!(
            " EXPENSE ".parse::<TransactionKind>().unwrap(),
            TransactionKind::Expense
        );
        assert!("transfer".parse::<TransactionKind>().is_err());
    }

    #[test]
    fn test_totals_serialize_with_report_keys() {
        let totals = Totals {
            income: 1000.0,
            expenses: 1200.0,
            net: -200.0,
        };
        let json = serde_json::to_value(totals).unwrap();
        assert_eq!(json["Total Income"], 1000.0);
        assert_eq!(json["Total Expenses"], 1200.0);
        assert_eq!(json["Net Savings"], -200.0);
    }

    #[test]
    fn test_interval_label_serializes_as_name() {
        let json = serde_json::to_string(&IntervalLabel::Monthly).unwrap();
        assert_eq!(json, "\"Monthly\"");
    }
}
