//! Report command implementations

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use ledgerlens_core::analytics::mean;
use ledgerlens_core::{format_currency, BaselineMode, FinancialAnalyzer, Report, Settings};

use super::{load_table, truncate};

/// Per-run overrides for the analysis settings
#[derive(Debug, Clone, Default)]
pub struct ReportOverrides {
    pub min_occurrences: Option<usize>,
    pub threshold: Option<f64>,
    pub baseline: Option<String>,
}

impl ReportOverrides {
    /// Apply the flags on top of `settings` and re-validate
    pub fn apply(&self, settings: &Settings) -> Result<Settings> {
        let mut settings = *settings;
        if let Some(min) = self.min_occurrences {
            settings.recurrence.min_occurrences = min;
        }
        if let Some(threshold) = self.threshold {
            settings.overspending.threshold_factor = threshold;
        }
        if let Some(ref baseline) = self.baseline {
            settings.overspending.baseline = baseline
                .parse::<BaselineMode>()
                .map_err(anyhow::Error::msg)?;
        }
        settings.validate().context("Invalid report options")?;
        Ok(settings)
    }
}

pub fn cmd_report(
    settings: &Settings,
    file: &Path,
    overrides: &ReportOverrides,
    json: bool,
) -> Result<()> {
    let settings = overrides.apply(settings)?;
    let table = load_table(file)?;
    let analyzer = FinancialAnalyzer::new(&table, settings.analysis());
    let report = analyzer.generate_report();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_report(
        &report,
        &analyzer.income_by_category(),
        settings.overspending.baseline,
    );
    Ok(())
}

/// One row of a category breakdown
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryShare {
    pub category: String,
    pub amount: f64,
    /// Percent of the breakdown's total (0 when the total is not positive)
    pub percentage: f64,
}

/// Categories by amount, largest first, with their share of the total
///
/// Equal amounts keep alphabetical order.
pub fn category_breakdown(totals: &BTreeMap<String, f64>) -> Vec<CategoryShare> {
    let total: f64 = totals.values().sum();
    let mut shares: Vec<CategoryShare> = totals
        .iter()
        .map(|(category, &amount)| CategoryShare {
            category: category.clone(),
            amount,
            percentage: if total > 0.0 {
                amount / total * 100.0
            } else {
                0.0
            },
        })
        .collect();
    shares.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    shares
}

fn print_breakdown(totals: &BTreeMap<String, f64>, empty: &str) {
    if totals.is_empty() {
        println!("   {}", empty);
        return;
    }
    println!("   {:25} │ {:>14} │ {:>6}", "Category", "Amount", "%");
    println!("   ──────────────────────────┼────────────────┼────────");
    for share in category_breakdown(totals) {
        println!(
            "   {:25} │ {:>14} │ {:>5.1}%",
            truncate(&share.category, 25),
            format_currency(share.amount),
            share.percentage
        );
    }
}

fn print_report(report: &Report, income: &BTreeMap<String, f64>, baseline: BaselineMode) {
    let totals = &report.totals;

    println!();
    println!("📊 Financial Overview");
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Total income:             {:>15}", format_currency(totals.income));
    println!("   Total expenses:           {:>15}", format_currency(totals.expenses));
    println!("   Net savings:              {:>15}", format_currency(totals.net));
    println!(
        "   Monthly average savings:  {:>15}",
        format_currency(report.monthly_average_savings)
    );

    println!();
    println!("🧾 Category Totals (expenses)");
    println!("   ─────────────────────────────────────────────────────────────");
    print_breakdown(&report.category_totals, "No expenses recorded.");

    println!();
    println!("💵 Income Sources");
    println!("   ─────────────────────────────────────────────────────────────");
    print_breakdown(income, "No income recorded.");

    println!();
    println!("🔁 Recurrent Charges");
    println!("   ─────────────────────────────────────────────────────────────");
    if report.recurrent_charges.is_empty() {
        println!("   No recurring charges found.");
    } else {
        println!(
            "   {:30} │ {:>10} │ {:>5} │ Interval",
            "Description", "Amount", "Count"
        );
        println!("   ───────────────────────────────┼────────────┼───────┼──────────");
        for charge in &report.recurrent_charges {
            let interval = match charge.mean_interval_days {
                Some(days) => format!("{} (~{:.0} days)", charge.estimated_interval, days),
                None => charge.estimated_interval.to_string(),
            };
            println!(
                "   {:30} │ {:>10} │ {:>5} │ {}",
                truncate(&charge.description, 30),
                format_currency(charge.amount),
                charge.frequency,
                interval
            );
        }
    }

    println!();
    match report.latest_month {
        Some(month) => println!("⚠️  Overspending in {} (baseline: {})", month, baseline),
        None => println!("⚠️  Overspending"),
    }
    println!("   ─────────────────────────────────────────────────────────────");
    if report.overspending_alerts.is_empty() {
        println!("   No significant overspending.");
    } else {
        for (category, alert) in &report.overspending_alerts {
            println!(
                "   {:25} {:>12} vs avg {:>12}  (+{:.1}%)",
                truncate(category, 25),
                format_currency(alert.current),
                format_currency(alert.average),
                alert.pct_over
            );
        }
    }

    let potential = &report.savings_potential;
    println!();
    println!("💰 Savings Potential");
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   Current net savings:      {:>15}",
        format_currency(potential.net_savings)
    );
    println!(
        "   Recoverable waste:        {:>15}",
        format_currency(potential.recoverable_waste)
    );
    println!(
        "   Potential savings:        {:>15}",
        format_currency(potential.potential)
    );
}

/// Monthly income, expense, and savings table
pub fn cmd_trends(settings: &Settings, file: &Path) -> Result<()> {
    let table = load_table(file)?;
    let analyzer = FinancialAnalyzer::new(&table, settings.analysis());
    let trends = analyzer.monthly_trends();

    println!();
    println!("📈 Monthly Trends");
    println!("   ─────────────────────────────────────────────────────────────");

    if trends.is_empty() {
        println!("   No dated transactions found.");
        return Ok(());
    }

    println!(
        "   {:8} │ {:>14} │ {:>14} │ {:>14}",
        "Month", "Income", "Expense", "Savings"
    );
    println!("   ─────────┼────────────────┼────────────────┼────────────────");
    for trend in &trends {
        let savings = format_currency(trend.savings);
        let savings = if trend.savings < 0.0 {
            format!("\x1b[31m{:>14}\x1b[0m", savings)
        } else {
            format!("{:>14}", savings)
        };
        println!(
            "   {:8} │ {:>14} │ {:>14} │ {}",
            trend.month.to_string(),
            format_currency(trend.income),
            format_currency(trend.expense),
            savings
        );
    }

    let savings: Vec<f64> = trends.iter().map(|t| t.savings).collect();
    let average = mean(&savings);
    println!();
    println!(
        "   Average monthly savings: {} over {} months",
        format_currency(average),
        trends.len()
    );

    Ok(())
}
