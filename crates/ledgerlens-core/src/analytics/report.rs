//! Report builder: composes the aggregator and both detectors

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::{MonthlyTrend, OverspendAlert, RecurringCharge, Report, SavingsPotential, Totals};
use crate::table::TransactionTable;

use super::aggregate;
use super::months::mean;
use super::overspend::{check_overspending, latest_expense_month, OverspendConfig};
use super::recurring::{detect_recurring, RecurrenceConfig};

/// Parameters for one analysis run
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub recurrence: RecurrenceConfig,
    pub overspending: OverspendConfig,
}

/// Stateless analyzer over a borrowed, immutable transaction table
///
/// Every method is a pure function of the table and the config; calling
/// them in any order, or repeatedly, gives the same results.
pub struct FinancialAnalyzer<'a> {
    table: &'a TransactionTable,
    config: AnalysisConfig,
}

impl<'a> FinancialAnalyzer<'a> {
    pub fn new(table: &'a TransactionTable, config: AnalysisConfig) -> Self {
        Self { table, config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn totals(&self) -> Totals {
        aggregate::totals(self.table)
    }

    pub fn category_totals(&self) -> BTreeMap<String, f64> {
        aggregate::category_totals(self.table)
    }

    pub fn income_by_category(&self) -> BTreeMap<String, f64> {
        aggregate::income_by_category(self.table)
    }

    pub fn monthly_trends(&self) -> Vec<MonthlyTrend> {
        aggregate::monthly_trends(self.table)
    }

    pub fn recurrent_charges(&self) -> Vec<RecurringCharge> {
        detect_recurring(self.table, &self.config.recurrence)
    }

    pub fn overspending(&self) -> BTreeMap<String, OverspendAlert> {
        check_overspending(self.table, &self.config.overspending)
    }

    /// Net savings plus the waste represented by flagged categories
    ///
    /// Mixes a lifetime net total with a single-month waste figure.
    pub fn savings_potential(&self) -> SavingsPotential {
        savings_potential(&self.totals(), &self.overspending())
    }

    /// Build the full report
    pub fn generate_report(&self) -> Report {
        let totals = self.totals();
        let monthly_trends = self.monthly_trends();
        let overspending_alerts = self.overspending();
        let recurrent_charges = self.recurrent_charges();

        let savings: Vec<f64> = monthly_trends.iter().map(|t| t.savings).collect();
        let monthly_average_savings = mean(&savings);
        let savings_potential = savings_potential(&totals, &overspending_alerts);

        info!(
            transactions = self.table.len(),
            months = monthly_trends.len(),
            recurring = recurrent_charges.len(),
            alerts = overspending_alerts.len(),
            "Generated financial report"
        );

        Report {
            totals,
            monthly_average_savings,
            recurrent_charges,
            overspending_alerts,
            category_totals: self.category_totals(),
            monthly_trends,
            savings_potential,
            latest_month: latest_expense_month(self.table),
        }
    }
}

fn savings_potential(
    totals: &Totals,
    alerts: &BTreeMap<String, OverspendAlert>,
) -> SavingsPotential {
    let recoverable_waste: f64 = alerts.values().map(|a| a.current - a.average).sum();
    SavingsPotential {
        net_savings: totals.net,
        recoverable_waste,
        potential: totals.net + recoverable_waste,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IntervalLabel, Transaction, TransactionKind};
    use chrono::{Duration, NaiveDate};

    fn tx(
        date: (i32, u32, u32),
        amount: f64,
        category: &str,
        kind: TransactionKind,
        description: &str,
    ) -> Transaction {
        Transaction::new(
            NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            amount,
            category,
            kind,
            description,
        )
    }

    fn sample_table() -> TransactionTable {
        let start = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        let mut rows = vec![
            tx((2024, 1, 1), 3000.0, "Salary", TransactionKind::Income, "Payroll"),
            tx((2024, 2, 1), 3000.0, "Salary", TransactionKind::Income, "Payroll"),
            tx((2024, 3, 1), 3000.0, "Salary", TransactionKind::Income, "Payroll"),
            tx((2024, 1, 5), 200.0, "Dining", TransactionKind::Expense, "Bistro"),
            tx((2024, 2, 5), 200.0, "Dining", TransactionKind::Expense, "Bistro"),
            tx((2024, 3, 5), 800.0, "Dining", TransactionKind::Expense, "Bistro"),
            tx((2024, 3, 9), 45.0, "Other", TransactionKind::Expense, "Cashback"),
        ];
        for i in 0..3 {
            rows.push(Transaction::new(
                start + Duration::days(30 * i),
                15.99,
                "Subscriptions",
                TransactionKind::Expense,
                "Netflix",
            ));
        }
        TransactionTable::new(rows)
    }

    #[test]
    fn test_scenario_salary_and_rent() {
        let table = TransactionTable::new(vec![
            tx((2024, 1, 1), 1000.0, "Salary", TransactionKind::Income, "Salary"),
            tx((2024, 1, 5), 1200.0, "Housing", TransactionKind::Expense, "Rent"),
        ]);
        let report = FinancialAnalyzer::new(&table, AnalysisConfig::default()).generate_report();

        assert_eq!(report.totals.income, 1000.0);
        assert_eq!(report.totals.expenses, 1200.0);
        assert_eq!(report.totals.net, -200.0);
        assert!(report.overspending_alerts.is_empty());
        assert_eq!(report.monthly_average_savings, -200.0);
    }

    #[test]
    fn test_scenario_empty_table() {
        let table = TransactionTable::default();
        let report = FinancialAnalyzer::new(&table, AnalysisConfig::default()).generate_report();

        assert_eq!(report.totals, Totals::default());
        assert!(report.monthly_trends.is_empty());
        assert!(report.recurrent_charges.is_empty());
        assert!(report.overspending_alerts.is_empty());
        assert!(report.category_totals.is_empty());
        assert_eq!(report.monthly_average_savings, 0.0);
        assert_eq!(report.savings_potential, SavingsPotential::default());
        assert_eq!(report.latest_month, None);
    }

    #[test]
    fn test_full_report() {
        let table = sample_table();
        let report = FinancialAnalyzer::new(&table, AnalysisConfig::default()).generate_report();

        // "Other" is income regardless of the source label
        assert_eq!(report.totals.income, 9045.0);
        assert!(!report.category_totals.contains_key("Other"));

        // Bistro amounts round apart, so only Netflix qualifies
        assert_eq!(report.recurrent_charges.len(), 1);
        let netflix = &report.recurrent_charges[0];
        assert_eq!(netflix.description, "Netflix");
        assert_eq!(netflix.estimated_interval, IntervalLabel::Monthly);

        let dining = report.overspending_alerts["Dining"];
        assert_eq!(dining.current, 800.0);
        assert_eq!(dining.average, 400.0);
        assert_eq!(report.savings_potential.recoverable_waste, 400.0);
        assert_eq!(
            report.savings_potential.potential,
            report.totals.net + 400.0
        );
    }

    #[test]
    fn test_net_equals_income_minus_expenses() {
        let table = sample_table();
        let totals = FinancialAnalyzer::new(&table, AnalysisConfig::default()).totals();
        assert_eq!(totals.net, totals.income - totals.expenses);
    }

    #[test]
    fn test_trend_sums_match_totals() {
        let table = sample_table();
        let analyzer = FinancialAnalyzer::new(&table, AnalysisConfig::default());
        let totals = analyzer.totals();
        let trends = analyzer.monthly_trends();

        let income: f64 = trends.iter().map(|t| t.income).sum();
        let expense: f64 = trends.iter().map(|t| t.expense).sum();
        assert!((income - totals.income).abs() < 1e-9);
        assert!((expense - totals.expenses).abs() < 1e-9);
    }

    #[test]
    fn test_report_is_idempotent() {
        let table = sample_table();
        let analyzer = FinancialAnalyzer::new(&table, AnalysisConfig::default());
        let first = analyzer.generate_report();
        let second = analyzer.generate_report();

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_report_json_keys() {
        let table = sample_table();
        let report = FinancialAnalyzer::new(&table, AnalysisConfig::default()).generate_report();
        let json = serde_json::to_value(&report).unwrap();

        for key in [
            "Totals",
            "Monthly Average Savings",
            "Recurrent Charges",
            "Overspending Alerts (Latest Month)",
            "Category Totals",
        ] {
            assert!(json.get(key).is_some(), "missing key {}", key);
        }
        assert_eq!(json["Latest Month"], "2024-03");
        assert_eq!(json["Overspending Alerts (Latest Month)"]["Dining"]["pct_over"], 100.0);
    }

    #[test]
    fn test_config_changes_results() {
        let table = sample_table();
        let config = AnalysisConfig {
            recurrence: RecurrenceConfig {
                min_occurrences: 4,
                ..Default::default()
            },
            overspending: OverspendConfig {
                threshold_factor: 3.0,
                ..Default::default()
            },
        };
        let report = FinancialAnalyzer::new(&table, config).generate_report();
        assert!(report.recurrent_charges.is_empty());
        assert!(report.overspending_alerts.is_empty());
    }
}
