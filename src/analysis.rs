//! Expenditure analysis
//!
//! The numbers are computed locally; the LLM only writes the prose summary.

use crate::llm::LlmClient;
use crate::models::{ExpenditureAnalysis, ExpenditureEntry, SpendingPatterns};
use crate::prompts;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

pub struct ExpenditureAnalyzer {
    llm: Arc<dyn LlmClient>,
}

impl ExpenditureAnalyzer {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// Analyze entries. Never fails: an unreachable LLM yields a stock summary.
    pub async fn analyze(&self, entries: &[ExpenditureEntry]) -> ExpenditureAnalysis {
        let (total_spending, category_breakdown, spending_patterns) = compute(entries);

        info!(
            total = total_spending,
            transactions = spending_patterns.transaction_count,
            categories = spending_patterns.categories_count,
            "Expenditure statistics computed"
        );

        let patterns_json = serde_json::to_value(&spending_patterns).unwrap_or_default();
        let prompt = prompts::analysis_summary(total_spending, &category_breakdown, &patterns_json);

        let analysis_summary = match self.llm.complete(&prompt).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!("LLM analysis summary generation failed: {}", e);
                prompts::ANALYSIS_SUMMARY_FALLBACK.to_string()
            }
        };

        ExpenditureAnalysis {
            total_spending,
            category_breakdown,
            spending_patterns,
            analysis_summary,
        }
    }
}

/// Deterministic statistics over a set of entries
pub fn compute(entries: &[ExpenditureEntry]) -> (f64, BTreeMap<String, f64>, SpendingPatterns) {
    let total: f64 = entries.iter().map(|e| e.amount).sum();

    let mut breakdown: BTreeMap<String, f64> = BTreeMap::new();
    for entry in entries {
        *breakdown.entry(entry.category.clone()).or_insert(0.0) += entry.amount;
    }

    // Walk categories in input order; strictly-greater keeps the first on ties
    let mut highest: Option<(&str, f64)> = None;
    for entry in entries {
        let amount = breakdown[&entry.category];
        match highest {
            Some((_, best)) if amount <= best => {}
            _ => highest = Some((entry.category.as_str(), amount)),
        }
    }
    let highest_category = highest
        .map(|(category, _)| category.to_string())
        .unwrap_or_default();

    let avg_transaction = if entries.is_empty() {
        0.0
    } else {
        total / entries.len() as f64
    };

    let patterns = SpendingPatterns {
        avg_transaction,
        highest_category,
        transaction_count: entries.len(),
        categories_count: breakdown.len(),
    };

    (total, breakdown, patterns)
}
