//! Totals, per-category spend, and the monthly trend series

use std::collections::BTreeMap;

use crate::models::{MonthlyTrend, Totals, Transaction, TransactionKind};
use crate::table::TransactionTable;

use super::months::MonthKey;

/// Sum of income, sum of expenses, and their difference
///
/// Rows with a missing amount contribute nothing.
pub fn totals(table: &TransactionTable) -> Totals {
    let income: f64 = table.income().filter_map(|t| t.amount).sum();
    let expenses: f64 = table.expenses().filter_map(|t| t.amount).sum();

    Totals {
        income,
        expenses,
        net: income - expenses,
    }
}

/// Expense total per category
pub fn category_totals(table: &TransactionTable) -> BTreeMap<String, f64> {
    sum_by_category(table.expenses())
}

/// Income total per category (sources such as salary or "Other")
pub fn income_by_category(table: &TransactionTable) -> BTreeMap<String, f64> {
    sum_by_category(table.income())
}

fn sum_by_category<'a>(rows: impl Iterator<Item = &'a Transaction>) -> BTreeMap<String, f64> {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for tx in rows {
        let Some(amount) = tx.amount else {
            continue;
        };
        *totals.entry(tx.category.clone()).or_insert(0.0) += amount;
    }
    totals
}

/// Income, expense, and savings for every month that has a dated row
///
/// The month set is the union of months seen on either side; a month with
/// activity on only one side reports zero for the other. Ascending order.
pub fn monthly_trends(table: &TransactionTable) -> Vec<MonthlyTrend> {
    let mut buckets: BTreeMap<MonthKey, (f64, f64)> = BTreeMap::new();

    for tx in table.transactions() {
        let Some(date) = tx.date else {
            continue;
        };
        let entry = buckets.entry(MonthKey::of(date)).or_insert((0.0, 0.0));
        let amount = tx.amount.unwrap_or(0.0);
        match tx.kind {
            TransactionKind::Income => entry.0 += amount,
            TransactionKind::Expense => entry.1 += amount,
        }
    }

    buckets
        .into_iter()
        .map(|(month, (income, expense))| MonthlyTrend {
            month,
            income,
            expense,
            savings: income - expense,
        })
        .collect()
}
