//! Query Classifier
//!
//! Maps a user message onto one of the six [`QueryType`] labels.
//! The LLM is asked first; if it cannot be reached the keyword lists decide.

use crate::llm::LlmClient;
use crate::models::QueryType;
use crate::prompts;
use tracing::{info, warn};

/// Static keyword lists, checked in this order
const EXPENDITURE_KEYWORDS: &[&str] = &[
    "spending", "expense", "expenditure", "analyze", "budget", "spent", "cost",
];

const INSIGHTS_KEYWORDS: &[&str] = &[
    "insights", "recommendations", "advice", "help", "tips", "improve", "save",
];

const TAX_KEYWORDS: &[&str] = &["tax", "taxation", "deduction", "filing", "irs", "refund"];

const INVESTMENT_KEYWORDS: &[&str] = &[
    "invest", "investment", "stocks", "portfolio", "returns", "market",
];

const REVENUE_KEYWORDS: &[&str] = &[
    "revenue", "income", "earnings", "profit", "salary", "business",
];

const KEYWORD_TABLE: &[(QueryType, &[&str])] = &[
    (QueryType::ExpenditureAnalysis, EXPENDITURE_KEYWORDS),
    (QueryType::InsightsGeneration, INSIGHTS_KEYWORDS),
    (QueryType::TaxAdvice, TAX_KEYWORDS),
    (QueryType::InvestmentAdvice, INVESTMENT_KEYWORDS),
    (QueryType::RevenueAnalysis, REVENUE_KEYWORDS),
];

/// Query classifier
pub struct QueryClassifier;

impl QueryClassifier {
    /// Classify via the LLM, falling back to keywords when the call fails.
    /// A reply that is not a known label counts as general chat.
    pub async fn classify(llm: &dyn LlmClient, message: &str) -> QueryType {
        match llm.complete(&prompts::classification(message)).await {
            Ok(reply) => {
                let query_type = QueryType::from_label(&reply).unwrap_or(QueryType::GeneralChat);
                info!(label = %reply.trim(), query_type = %query_type, "LLM classification");
                query_type
            }
            Err(e) => {
                warn!("Classification error, using keyword fallback: {}", e);
                Self::keyword_classify(message)
            }
        }
    }

    /// Keyword-based classification
    pub fn keyword_classify(message: &str) -> QueryType {
        let lowered = message.to_lowercase();

        KEYWORD_TABLE
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|kw| lowered.contains(kw)))
            .map(|(query_type, _)| *query_type)
            .unwrap_or(QueryType::GeneralChat)
    }
}
