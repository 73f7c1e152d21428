//! Prompt templates and fallback texts
//!
//! One template per handler. Advice types share a template and differ only
//! in the role line.

use crate::llm::Prompt;
use crate::models::{ExpenditureAnalysis, QueryType};
use std::collections::BTreeMap;

pub const MISSING_DATA_REPLY: &str = "To analyze your expenditure, I'll need your spending data. \
You can provide it in your next message, or I can give you general budgeting advice instead. \
What would you prefer?";

pub const ANALYSIS_SUMMARY_FALLBACK: &str = "The expenditure analysis has been completed.";

pub const INSIGHTS_FALLBACK: &str = "Here are some general financial insights: Track your expenses \
regularly, set monthly budgets, and review your spending patterns to identify areas for improvement.";

pub const GENERAL_CHAT_FALLBACK: &str = "I'm here to help with your financial questions! Feel free \
to ask about budgeting, investments, taxes, or any other money-related topics.";

const CLASSIFICATION_CATEGORIES: &[(QueryType, &str)] = &[
    (QueryType::ExpenditureAnalysis, "User wants to analyze spending/expenses/budget"),
    (QueryType::InsightsGeneration, "User wants financial insights, recommendations, or advice"),
    (QueryType::TaxAdvice, "User asks about taxes, deductions, or tax planning"),
    (QueryType::InvestmentAdvice, "User asks about investments, stocks, or portfolio"),
    (QueryType::RevenueAnalysis, "User asks about income, revenue, or earnings analysis"),
    (QueryType::GeneralChat, "General financial questions or conversation"),
];

/// Role line for the three advice query types
pub fn advice_role(query_type: QueryType) -> Option<&'static str> {
    match query_type {
        QueryType::TaxAdvice => Some(
            "You are a tax advisor. Provide helpful tax advice and tips for the user's question. \
             Be specific and actionable.",
        ),
        QueryType::InvestmentAdvice => Some(
            "You are an investment advisor. Provide investment guidance and strategies for the \
             user's question. Focus on practical advice.",
        ),
        QueryType::RevenueAnalysis => Some(
            "You are a financial analyst. Provide revenue analysis and business income insights \
             for the user's question.",
        ),
        _ => None,
    }
}

/// Canned answer when the advice call fails
pub fn advice_fallback(query_type: QueryType) -> &'static str {
    match query_type {
        QueryType::TaxAdvice => "For tax advice, consider consulting with a tax professional. \
            Keep detailed records of your expenses and income throughout the year.",
        QueryType::InvestmentAdvice => "For investments, consider diversifying your portfolio and \
            investing in low-cost index funds. Always do your research before investing.",
        QueryType::RevenueAnalysis => "To analyze revenue, track your income sources, monitor \
            trends over time, and identify your most profitable activities.",
        _ => "I'm here to help with your financial questions.",
    }
}

pub fn classification(message: &str) -> Prompt {
    let categories = CLASSIFICATION_CATEGORIES
        .iter()
        .map(|(t, desc)| format!("- {}: {}", t, desc))
        .collect::<Vec<_>>()
        .join("\n");

    Prompt::user(format!(
        r#"Classify the following user message into one of these categories:
{}

User message: "{}"

Respond with only the category name (e.g., "expenditure_analysis")."#,
        categories, message
    ))
}

pub fn analysis_summary(
    total: f64,
    breakdown: &BTreeMap<String, f64>,
    patterns: &serde_json::Value,
) -> Prompt {
    Prompt::with_system(
        format!(
            r#"You are a financial analyst. You will analyze the following financial data:

Total Spending: ${:.2}
Category Breakdown: {}
Spending Patterns: {}

Please provide a brief analysis summary."#,
            total,
            pretty(breakdown),
            pretty(patterns),
        ),
        "Analyze expenditure",
    )
}

pub fn insights_json(analysis: &ExpenditureAnalysis, user_context: &str) -> Prompt {
    Prompt::with_system(
        format!(
            r#"You are a financial analyst. You will analyze the following financial data and provide insights:

Total Spending: ${:.2}
Category Breakdown: {}
Spending Patterns: {}
Analysis Summary: {}
User Context: {}

Please provide a JSON response with:
1. "insights": List of 3-5 key insights about spending behavior
2. "recommendations": List of 3-5 actionable recommendations
3. "financial_score": Score from 1-100 based on spending health
4. "summary": Brief overall summary

Format as valid JSON only."#,
            analysis.total_spending,
            pretty(&analysis.category_breakdown),
            pretty(&analysis.spending_patterns),
            analysis.analysis_summary,
            user_context,
        ),
        "Generate financial insights",
    )
}

pub fn insights_without_data(message: &str, user_context: &str) -> Prompt {
    Prompt::user(format!(
        r#"The user is asking for financial insights: "{}"
User context: {}

Provide personalized financial insights and recommendations in a conversational tone.
Focus on actionable advice for better financial management.
Keep it practical and helpful."#,
        message, user_context
    ))
}

/// `None` for query types that are not advice
pub fn advice(query_type: QueryType, message: &str, user_context: &str) -> Option<Prompt> {
    let role = advice_role(query_type)?;

    Some(Prompt::with_system(
        role,
        format!(
            r#"User question: "{}"
User context: {}

Provide clear, actionable advice in a conversational tone.
Include specific steps or recommendations where appropriate.
Keep it practical and helpful."#,
            message, user_context
        ),
    ))
}

pub fn general_chat(message: &str, user_context: &str) -> Prompt {
    Prompt::user(format!(
        r#"The user is asking: "{}"
User context: {}

This appears to be a general financial question. Provide a helpful, conversational response
related to personal finance, money management, or financial planning.
Keep it friendly and informative."#,
        message, user_context
    ))
}

fn pretty<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_lists_every_label() {
        let prompt = classification("How do I file taxes?");
        for t in QueryType::ALL {
            assert!(prompt.user.contains(t.as_str()), "missing {}", t);
        }
        assert!(prompt.user.contains("\"How do I file taxes?\""));
        assert!(prompt.system.is_none());
    }

    #[test]
    fn test_advice_template_selection() {
        let tax = advice(QueryType::TaxAdvice, "q", "").unwrap();
        assert!(tax.system.unwrap().starts_with("You are a tax advisor"));

        let invest = advice(QueryType::InvestmentAdvice, "q", "").unwrap();
        assert!(invest.system.unwrap().starts_with("You are an investment advisor"));

        let revenue = advice(QueryType::RevenueAnalysis, "q", "").unwrap();
        assert!(revenue.system.unwrap().contains("revenue analysis"));

        assert!(advice(QueryType::GeneralChat, "q", "").is_none());
        assert!(advice(QueryType::ExpenditureAnalysis, "q", "").is_none());
    }

    #[test]
    fn test_advice_role_matches_is_advice() {
        for t in QueryType::ALL {
            assert_eq!(advice_role(t).is_some(), t.is_advice());
        }
    }

    #[test]
    fn test_user_context_is_embedded() {
        let prompt = general_chat("Should I rent or buy?", "Lives in Berlin");
        assert!(prompt.user.contains("Should I rent or buy?"));
        assert!(prompt.user.contains("User context: Lives in Berlin"));
    }

    #[test]
    fn test_analysis_summary_formats_total() {
        let mut breakdown = BTreeMap::new();
        breakdown.insert("food".to_string(), 10.0);
        let prompt = analysis_summary(1234.5, &breakdown, &serde_json::json!({}));
        let system = prompt.system.unwrap();
        assert!(system.contains("Total Spending: $1234.50"));
        assert!(system.contains("\"food\": 10.0"));
        assert_eq!(prompt.user, "Analyze expenditure");
    }
}
