//! Recurring charge detection
//!
//! Expenses are grouped by exact description and amount rounded to the
//! nearest whole unit. A group that occurs at least `min_occurrences` times
//! is reported, labelled `Monthly` when the mean gap between consecutive
//! occurrences falls inside the monthly window.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{IntervalLabel, RecurringCharge};
use crate::table::TransactionTable;

use super::months::{mean, round_amount};

/// Recurrence detection thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecurrenceConfig {
    /// Minimum group size to report
    pub min_occurrences: usize,
    /// Inclusive lower bound of the mean gap (days) for a monthly label
    pub monthly_min_days: f64,
    /// Inclusive upper bound of the mean gap (days) for a monthly label
    pub monthly_max_days: f64,
}

impl Default for RecurrenceConfig {
    fn default() -> Self {
        Self {
            min_occurrences: 3,
            monthly_min_days: 28.0,
            monthly_max_days: 32.0,
        }
    }
}

/// Group key: description plus rounded amount (as whole units)
type GroupKey = (String, i64);

/// Find description + rounded-amount groups that repeat often enough
///
/// Expenses without a description or amount cannot be grouped and are
/// ignored. Undated rows count toward the group size but not the gap
/// calculation. Output is ordered by description, then amount.
pub fn detect_recurring(table: &TransactionTable, config: &RecurrenceConfig) -> Vec<RecurringCharge> {
    let mut groups: BTreeMap<GroupKey, Vec<Option<NaiveDate>>> = BTreeMap::new();

    for tx in table.expenses() {
        let (Some(description), Some(amount)) = (tx.description.as_ref(), tx.amount) else {
            continue;
        };
        let rounded = round_amount(amount) as i64;
        groups
            .entry((description.clone(), rounded))
            .or_default()
            .push(tx.date);
    }

    let charges: Vec<RecurringCharge> = groups
        .into_iter()
        .filter(|(_, dates)| dates.len() >= config.min_occurrences)
        .map(|((description, rounded), dates)| {
            let mean_interval_days = mean_gap_days(&dates);
            let estimated_interval = classify_interval(mean_interval_days, config);

            RecurringCharge {
                description,
                amount: rounded as f64,
                frequency: dates.len(),
                estimated_interval,
                mean_interval_days,
            }
        })
        .collect();

    debug!("Detected {} recurring charge groups", charges.len());
    charges
}

/// Mean of day gaps between consecutive dated occurrences
///
/// `None` when fewer than two occurrences carry a date.
fn mean_gap_days(dates: &[Option<NaiveDate>]) -> Option<f64> {
    let mut sorted: Vec<NaiveDate> = dates.iter().flatten().copied().collect();
    if sorted.len() < 2 {
        return None;
    }
    sorted.sort();

    let gaps: Vec<f64> = sorted
        .windows(2)
        .map(|w| (w[1] - w[0]).num_days() as f64)
        .collect();
    Some(mean(&gaps))
}

fn classify_interval(mean_gap: Option<f64>, config: &RecurrenceConfig) -> IntervalLabel {
    match mean_gap {
        Some(gap) if gap >= config.monthly_min_days && gap <= config.monthly_max_days => {
            IntervalLabel::Monthly
        }
        _ => IntervalLabel::Irregular,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Transaction, TransactionKind};
    use chrono::Duration;

    fn expense(date: NaiveDate, amount: f64, description: &str) -> Transaction {
        Transaction::new(
            date,
            amount,
            "Subscriptions",
            TransactionKind::Expense,
            description,
        )
    }

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn test_monthly_subscription_detected() {
        let table = TransactionTable::new(
            (0..3)
                .map(|i| expense(start() + Duration::days(30 * i), 15.99, "Netflix"))
                .collect(),
        );

        let charges = detect_recurring(&table, &RecurrenceConfig::default());
        assert_eq!(charges.len(), 1);
        let netflix = &charges[0];
        assert_eq!(netflix.description, "Netflix");
        assert_eq!(netflix.amount, 16.0);
        assert_eq!(netflix.frequency, 3);
        assert_eq!(netflix.estimated_interval, IntervalLabel::Monthly);
        assert_eq!(netflix.mean_interval_days, Some(30.0));
    }

    #[test]
    fn test_below_threshold_excluded() {
        let table = TransactionTable::new(vec![
            expense(start(), 9.99, "Spotify"),
            expense(start() + Duration::days(30), 9.99, "Spotify"),
        ]);
        assert!(detect_recurring(&table, &RecurrenceConfig::default()).is_empty());
    }

    #[test]
    fn test_weekly_group_is_irregular() {
        let table = TransactionTable::new(
            (0..4)
                .map(|i| expense(start() + Duration::days(7 * i), 5.0, "Coffee Club"))
                .collect(),
        );
        let charges = detect_recurring(&table, &RecurrenceConfig::default());
        assert_eq!(charges[0].estimated_interval, IntervalLabel::Irregular);
        assert_eq!(charges[0].mean_interval_days, Some(7.0));
    }

    #[test]
    fn test_window_bounds_inclusive() {
        for gap in [28, 32] {
            let table = TransactionTable::new(
                (0..3)
                    .map(|i| expense(start() + Duration::days(gap * i), 10.0, "Gym"))
                    .collect(),
            );
            let charges = detect_recurring(&table, &RecurrenceConfig::default());
            assert_eq!(charges[0].estimated_interval, IntervalLabel::Monthly, "gap {}", gap);
        }

        let table = TransactionTable::new(
            (0..3)
                .map(|i| expense(start() + Duration::days(33 * i), 10.0, "Gym"))
                .collect(),
        );
        let charges = detect_recurring(&table, &RecurrenceConfig::default());
        assert_eq!(charges[0].estimated_interval, IntervalLabel::Irregular);
    }

    #[test]
    fn test_near_identical_amounts_share_group() {
        let table = TransactionTable::new(vec![
            expense(start(), 15.99, "Netflix"),
            expense(start() + Duration::days(31), 16.01, "Netflix"),
            expense(start() + Duration::days(59), 15.75, "Netflix"),
        ]);
        let charges = detect_recurring(&table, &RecurrenceConfig::default());
        assert_eq!(charges.len(), 1);
        assert_eq!(charges[0].frequency, 3);
    }

    #[test]
    fn test_different_descriptions_split() {
        let mut rows: Vec<Transaction> = (0..3)
            .map(|i| expense(start() + Duration::days(30 * i), 10.0, "Hulu"))
            .collect();
        rows.extend((0..3).map(|i| expense(start() + Duration::days(30 * i), 10.0, "HULU")));

        let charges = detect_recurring(&TransactionTable::new(rows), &RecurrenceConfig::default());
        let names: Vec<&str> = charges.iter().map(|c| c.description.as_str()).collect();
        assert_eq!(names, vec!["HULU", "Hulu"]);
    }

    #[test]
    fn test_gaps_use_sorted_dates() {
        // Ingestion order is not date order
        let table = TransactionTable::new(vec![
            expense(start() + Duration::days(60), 20.0, "Phone"),
            expense(start(), 20.0, "Phone"),
            expense(start() + Duration::days(30), 20.0, "Phone"),
        ]);
        let charges = detect_recurring(&table, &RecurrenceConfig::default());
        assert_eq!(charges[0].mean_interval_days, Some(30.0));
    }

    #[test]
    fn test_undated_rows_count_but_do_not_gap() {
        let mut undated = expense(start(), 20.0, "Phone");
        undated.date = None;
        let table = TransactionTable::new(vec![
            expense(start(), 20.0, "Phone"),
            undated,
            expense(start() + Duration::days(29), 20.0, "Phone"),
        ]);
        let charges = detect_recurring(&table, &RecurrenceConfig::default());
        assert_eq!(charges[0].frequency, 3);
        assert_eq!(charges[0].mean_interval_days, Some(29.0));
        assert_eq!(charges[0].estimated_interval, IntervalLabel::Monthly);
    }

    #[test]
    fn test_income_ignored() {
        let table = TransactionTable::new(
            (0..3)
                .map(|i| {
                    Transaction::new(
                        start() + Duration::days(30 * i),
                        2500.0,
                        "Salary",
                        TransactionKind::Income,
                        "Payroll",
                    )
                })
                .collect(),
        );
        assert!(detect_recurring(&table, &RecurrenceConfig::default()).is_empty());
    }

    #[test]
    fn test_deterministic() {
        let table = TransactionTable::new(vec![
            expense(start(), 10.0, "B"),
            expense(start(), 10.0, "A"),
            expense(start() + Duration::days(30), 10.0, "B"),
            expense(start() + Duration::days(30), 10.0, "A"),
            expense(start() + Duration::days(60), 10.0, "B"),
            expense(start() + Duration::days(60), 10.0, "A"),
        ]);
        let config = RecurrenceConfig::default();
        assert_eq!(
            detect_recurring(&table, &config),
            detect_recurring(&table, &config)
        );
    }
}
