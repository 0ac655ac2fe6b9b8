//! Integration tests for ledgerlens-core
//!
//! These tests exercise the full load → table → report → advice workflow.

use std::io::Write;

use ledgerlens_core::advisor::DEBT_QUERY;
use ledgerlens_core::retrieval::BUDGET_GUIDELINES;
use ledgerlens_core::{
    load_file, parse_csv, Advisor, AnalysisConfig, BaselineMode, Error, FinancialAnalyzer,
    HashingEmbedder, IntervalLabel, MockBackend, OverspendConfig, PromptLibrary, RetrievalIndex,
    Settings, TransactionKind, TransactionTable,
};

/// Three months of a household ledger:
/// - Salary every month, an "Other" cashback row labelled Expense
/// - Netflix at 15.99 every 30 days (recurring, monthly)
/// - Dining doubling in March (overspending)
/// - One exact duplicate row and one row with an unparseable amount
fn household_csv() -> &'static str {
    "Date,Transaction Description,Category,Amount,Type\n\
     2024-01-01,Payroll,Salary,3000.00,Income\n\
     2024-02-01,Payroll,Salary,3000.00,Income\n\
     2024-03-01,Payroll,Salary,3000.00,Income\n\
     2024-01-03,Netflix,Subscriptions,15.99,Expense\n\
     2024-02-02,Netflix,Subscriptions,15.99,Expense\n\
     2024-03-03,Netflix,Subscriptions,15.99,Expense\n\
     2024-01-05,Rent,Housing,\"1,200.00\",Expense\n\
     2024-02-05,Rent,Housing,\"1,200.00\",Expense\n\
     2024-03-05,Rent,Housing,\"1,200.00\",Expense\n\
     2024-01-12,Bistro,Dining,200.00,Expense\n\
     2024-02-12,Bistro,Dining,200.00,Expense\n\
     2024-03-12,Bistro,dining,800.00,Expense\n\
     2024-03-12,Bistro,dining,800.00,Expense\n\
     2024-03-15,Cashback,Other,45.00,Expense\n\
     2024-03-20,Mystery,Shopping,n/a,Expense\n"
}

fn write_csv(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn household_table() -> TransactionTable {
    let file = write_csv(household_csv());
    let raw = load_file(file.path()).expect("Failed to load ledger");
    TransactionTable::from_raw(&raw).expect("Schema should be valid")
}

// =============================================================================
// Load + Schema
// =============================================================================

#[test]
fn test_load_dedupes_and_normalizes() {
    let file = write_csv(household_csv());
    let raw = load_file(file.path()).unwrap();

    assert_eq!(raw.stats.rows_read, 15);
    assert_eq!(raw.stats.duplicates_removed, 1);
    assert_eq!(raw.rows.len(), 14);
    assert!(raw.column("transaction_description").is_some());
}

#[test]
fn test_other_rule_and_missing_amounts() {
    let table = household_table();

    let cashback = table
        .transactions()
        .iter()
        .find(|t| t.description.as_deref() == Some("Cashback"))
        .unwrap();
    assert_eq!(cashback.kind, TransactionKind::Income);

    assert_eq!(table.stats().missing_amounts, 1);
    assert_eq!(table.stats().reclassified_rows, 1);
}

#[test]
fn test_unsupported_and_missing_files() {
    let dir = tempfile::tempdir().unwrap();
    let xlsx = dir.path().join("ledger.xlsx");
    std::fs::write(&xlsx, b"not really excel").unwrap();

    assert!(matches!(load_file(&xlsx), Err(Error::UnsupportedFormat(_))));
    assert!(matches!(
        load_file(&dir.path().join("missing.csv")),
        Err(Error::Load(_))
    ));
}

#[test]
fn test_schema_error_before_analysis() {
    let raw = parse_csv("date,description,amount\n2024-01-01,Coffee,4.50\n".as_bytes()).unwrap();
    match TransactionTable::from_raw(&raw) {
        Err(Error::Schema(missing)) => assert_eq!(missing, vec!["category", "type"]),
        other => panic!("expected schema error, got {:?}", other),
    }
}

// =============================================================================
// Report
// =============================================================================

#[test]
fn test_full_report_workflow() {
    let table = household_table();
    let report = FinancialAnalyzer::new(&table, AnalysisConfig::default()).generate_report();

    // 9000 salary + 45 cashback
    assert_eq!(report.totals.income, 9045.0);
    // 3 * 15.99 + 3 * 1200 + 200 + 200 + 800
    assert!((report.totals.expenses - 4847.97).abs() < 1e-9);
    assert_eq!(report.totals.net, report.totals.income - report.totals.expenses);

    // Category spelling unified to the first seen
    assert!(report.category_totals.contains_key("Dining"));
    assert!(!report.category_totals.contains_key("dining"));
    assert_eq!(report.category_totals["Dining"], 1200.0);

    let charges: Vec<(&str, IntervalLabel)> = report
        .recurrent_charges
        .iter()
        .map(|c| (c.description.as_str(), c.estimated_interval))
        .collect();
    // Payroll is income; Bistro splits into 200 x2 and 800 x1
    assert_eq!(
        charges,
        vec![
            ("Netflix", IntervalLabel::Monthly),
            ("Rent", IntervalLabel::Monthly)
        ]
    );

    assert_eq!(report.overspending_alerts.len(), 1);
    let dining = report.overspending_alerts["Dining"];
    assert_eq!(dining.current, 800.0);
    assert_eq!(dining.average, 400.0);
    assert_eq!(dining.pct_over, 100.0);

    assert_eq!(report.savings_potential.recoverable_waste, 400.0);
    assert_eq!(report.monthly_trends.len(), 3);
    assert_eq!(report.latest_month.map(|m| m.to_string()).as_deref(), Some("2024-03"));
}

#[test]
fn test_prior_months_baseline() {
    let table = household_table();
    let config = AnalysisConfig {
        overspending: OverspendConfig {
            baseline: BaselineMode::PriorMonths,
            ..Default::default()
        },
        ..Default::default()
    };
    let report = FinancialAnalyzer::new(&table, config).generate_report();

    let dining = report.overspending_alerts["Dining"];
    assert_eq!(dining.average, 200.0);
    assert_eq!(dining.pct_over, 300.0);
}

#[test]
fn test_settings_file_drives_analysis() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledgerlens.toml");
    std::fs::write(
        &path,
        "[recurrence]\nmin_occurrences = 4\n\n[overspending]\nthreshold_factor = 2.5\n",
    )
    .unwrap();

    let settings = Settings::load(Some(&path)).expect("Settings should load");
    assert_eq!(settings.retrieval.top_k, 5);

    let table = household_table();
    let report = FinancialAnalyzer::new(&table, settings.analysis()).generate_report();

    // Nothing repeats four times; 800 is not above 400 * 2.5
    assert!(report.recurrent_charges.is_empty());
    assert!(report.overspending_alerts.is_empty());
    assert_eq!(report.savings_potential.recoverable_waste, 0.0);
}

#[test]
fn test_empty_ledger_report() {
    let file = write_csv("date,description,category,amount,type\n");
    let raw = load_file(file.path()).unwrap();
    let table = TransactionTable::from_raw(&raw).unwrap();
    let report = FinancialAnalyzer::new(&table, AnalysisConfig::default()).generate_report();

    assert_eq!(report.totals.income, 0.0);
    assert_eq!(report.totals.expenses, 0.0);
    assert_eq!(report.totals.net, 0.0);
    assert!(report.monthly_trends.is_empty());
    assert!(report.recurrent_charges.is_empty());
    assert!(report.overspending_alerts.is_empty());
}

#[test]
fn test_report_json_is_stable() {
    let table = household_table();
    let analyzer = FinancialAnalyzer::new(&table, AnalysisConfig::default());

    let first = serde_json::to_string_pretty(&analyzer.generate_report()).unwrap();
    let second = serde_json::to_string_pretty(&analyzer.generate_report()).unwrap();
    assert_eq!(first, second);

    let value: serde_json::Value = serde_json::from_str(&first).unwrap();
    assert_eq!(value["Totals"]["Total Income"], 9045.0);
    assert_eq!(value["Recurrent Charges"][0]["estimated_interval"], "Monthly");
}

// =============================================================================
// Advice
// =============================================================================

#[tokio::test]
async fn test_advice_workflow() {
    let table = household_table();
    let report = FinancialAnalyzer::new(&table, AnalysisConfig::default()).generate_report();

    let embedder = HashingEmbedder::default();
    let index = RetrievalIndex::build(&embedder, BUDGET_GUIDELINES)
        .await
        .unwrap();

    let mut advisor = Advisor::new(MockBackend::new())
        .with_prompts(PromptLibrary::embedded_only())
        .with_top_k(4);
    let advice = advisor.advise(&report, &index, &embedder).await.unwrap();

    assert_ne!(advice.query, DEBT_QUERY);
    assert_eq!(advice.strategies.len(), 4);
    assert!(advice.text.starts_with("Mock financial plan"));
}
