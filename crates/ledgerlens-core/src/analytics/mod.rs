//! Financial analytics engine
//!
//! Pure functions over an immutable [`TransactionTable`](crate::table::TransactionTable):
//! - `aggregate`: totals, category spend, monthly trend series
//! - `recurring`: description + rounded-amount clustering with interval inference
//! - `overspend`: latest-month category spend against the historical average
//! - `report`: composes the three into a [`Report`](crate::models::Report)

pub mod aggregate;
pub mod months;
pub mod overspend;
pub mod recurring;
pub mod report;

pub use aggregate::{category_totals, income_by_category, monthly_trends, totals};
pub use months::{mean, round_amount, MonthKey};
pub use overspend::{check_overspending, latest_expense_month, BaselineMode, OverspendConfig};
pub use recurring::{detect_recurring, RecurrenceConfig};
pub use report::{AnalysisConfig, FinancialAnalyzer};
