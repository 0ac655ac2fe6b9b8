//! Advice generation: report + retrieved strategies -> written plan
//!
//! One retrieval query per request, chosen from the report's net savings,
//! then one generation call through the AI backend.

use std::collections::HashMap;

use serde::Serialize;
use tracing::info;

use crate::ai::AIBackend;
use crate::config::AdvisorConfig;
use crate::error::Result;
use crate::models::Report;
use crate::prompts::{PromptId, PromptLibrary};
use crate::retrieval::{Embedder, RetrievalIndex};

/// Retrieval query when the user is running a deficit
pub const DEBT_QUERY: &str = "strategies for getting out of debt and stopping overspending";
/// Retrieval query otherwise
pub const SAVINGS_QUERY: &str = "How to fix overspending and save money debt";

/// Generated advice and what it was built from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Advice {
    pub text: String,
    /// Strategies given to the model, best match first
    pub strategies: Vec<String>,
    pub query: String,
}

pub struct Advisor<B> {
    backend: B,
    prompts: PromptLibrary,
    config: AdvisorConfig,
    top_k: usize,
}

impl<B: AIBackend> Advisor<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            prompts: PromptLibrary::new(),
            config: AdvisorConfig::default(),
            top_k: 5,
        }
    }

    pub fn with_prompts(mut self, prompts: PromptLibrary) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_config(mut self, config: AdvisorConfig) -> Self {
        self.config = config;
        self
    }

    /// Number of strategies to retrieve
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Pick the retrieval query for a report
    pub fn query_for(report: &Report) -> &'static str {
        if report.totals.net < 0.0 {
            DEBT_QUERY
        } else {
            SAVINGS_QUERY
        }
    }

    /// Retrieve strategies, render the plan prompt, and generate advice
    pub async fn advise<E>(
        &mut self,
        report: &Report,
        index: &RetrievalIndex,
        embedder: &E,
    ) -> Result<Advice>
    where
        E: Embedder + ?Sized,
    {
        let query = Self::query_for(report);
        let strategies = index.retrieve(embedder, query, self.top_k).await?;

        let (system, prompt) = self.render_prompt(report, &strategies)?;

        info!(
            model = self.backend.model(),
            strategies = strategies.len(),
            "Generating financial plan"
        );
        let text = self
            .backend
            .generate(&system, &prompt, self.config.temperature)
            .await?;

        Ok(Advice {
            text,
            strategies,
            query: query.to_string(),
        })
    }

    /// Render the system and user prompt for a report
    pub fn render_prompt(&mut self, report: &Report, strategies: &[String]) -> Result<(String, String)> {
        let vars = prompt_vars(report, strategies);
        let prompt = self.prompts.get(PromptId::FinancialPlan)?;
        Ok((prompt.render_system(&vars), prompt.render_user(&vars)))
    }
}

fn prompt_vars(report: &Report, strategies: &[String]) -> HashMap<&'static str, String> {
    let overspending = if report.overspending_alerts.is_empty() {
        "No significant overspending.".to_string()
    } else {
        report
            .overspending_alerts
            .iter()
            .map(|(category, alert)| {
                format!(
                    "- {}: Current {} (Avg {}) -> +{:.1}% higher",
                    category,
                    format_currency(alert.current),
                    format_currency(alert.average),
                    alert.pct_over
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let recurring = report
        .recurrent_charges
        .iter()
        .map(|c| {
            format!(
                "- {}: {} x{} ({})",
                c.description,
                format_currency(c.amount),
                c.frequency,
                c.estimated_interval
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let strategies = if strategies.is_empty() {
        "No strategies retrieved.".to_string()
    } else {
        strategies
            .iter()
            .map(|s| format!("- {}", s))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let mut vars = HashMap::new();
    vars.insert("total_income", format_currency(report.totals.income));
    vars.insert("total_expenses", format_currency(report.totals.expenses));
    vars.insert("net_savings", format_currency(report.totals.net));
    vars.insert(
        "monthly_average_savings",
        format_currency(report.monthly_average_savings),
    );
    vars.insert(
        "latest_month",
        report
            .latest_month
            .map(|m| m.to_string())
            .unwrap_or_default(),
    );
    vars.insert(
        "recoverable_waste",
        format_currency(report.savings_potential.recoverable_waste),
    );
    vars.insert("overspending", overspending);
    vars.insert("recurring", recurring);
    vars.insert("strategies", strategies);
    vars
}

/// Format an amount as `$1,234.56` (`-$200.00` when negative)
pub fn format_currency(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let cents = format!("{:.2}", amount.abs());
    let (whole, fraction) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}${}.{}", sign, grouped, fraction)
}
