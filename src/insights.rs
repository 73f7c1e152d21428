//! Insights generation
//!
//! Asks the LLM for a JSON verdict on an [`ExpenditureAnalysis`] and turns it
//! into an [`InsightResponse`]. Parsing is lenient; transport failures fall
//! back to a rule-based response.

use crate::llm::LlmClient;
use crate::models::{ExpenditureAnalysis, InsightResponse};
use crate::prompts;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

const DEFAULT_SCORE: u8 = 50;

pub struct InsightsAgent {
    llm: Arc<dyn LlmClient>,
}

impl InsightsAgent {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    pub async fn generate(
        &self,
        analysis: &ExpenditureAnalysis,
        user_context: &str,
    ) -> InsightResponse {
        let prompt = prompts::insights_json(analysis, user_context);

        match self.llm.complete(&prompt).await {
            Ok(reply) => {
                debug!("LLM insights response: {}", reply);
                parse_insights(&reply)
            }
            Err(e) => {
                warn!("Insights generation failed, using fallback: {}", e);
                fallback_insights(analysis)
            }
        }
    }
}

/// Parse the first `{` .. last `}` span of an LLM reply
pub fn parse_insights(reply: &str) -> InsightResponse {
    let parsed = match (reply.find('{'), reply.rfind('}')) {
        (Some(start), Some(end)) if start < end => {
            serde_json::from_str::<Value>(&reply[start..=end]).ok()
        }
        _ => None,
    };

    let Some(data) = parsed.filter(Value::is_object) else {
        return InsightResponse {
            insights: vec!["Unable to parse AI response".to_string()],
            recommendations: vec!["Please try again".to_string()],
            financial_score: DEFAULT_SCORE,
            summary: "Error processing AI response".to_string(),
        };
    };

    InsightResponse {
        insights: string_list(data.get("insights")),
        recommendations: string_list(data.get("recommendations")),
        financial_score: data
            .get("financial_score")
            .and_then(score_from_value)
            .unwrap_or(DEFAULT_SCORE),
        summary: data
            .get("summary")
            .and_then(Value::as_str)
            .unwrap_or("Analysis completed")
            .to_string(),
    }
}

/// Rule-based insights used when the LLM is unreachable
pub fn fallback_insights(analysis: &ExpenditureAnalysis) -> InsightResponse {
    let patterns = &analysis.spending_patterns;

    let insights = vec![
        format!("Your total spending is ${:.2}", analysis.total_spending),
        format!("You have {} spending categories", patterns.categories_count),
        format!("Your highest spending category is {}", patterns.highest_category),
    ];

    let recommendations = vec![
        "Track your expenses regularly".to_string(),
        "Set budget limits for each category".to_string(),
        "Review and optimize your highest spending categories".to_string(),
    ];

    InsightResponse {
        insights,
        recommendations,
        financial_score: fallback_score(analysis.total_spending),
        summary: "Basic analysis completed with fallback insights".to_string(),
    }
}

/// 100 minus ten points per 1000 spent, kept within 10..=100
pub fn fallback_score(total_spending: f64) -> u8 {
    let raw = (100.0 - (total_spending / 1000.0) * 10.0).trunc() as i64;
    raw.clamp(10, 100) as u8
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Null => None,
                    other => Some(other.to_string()),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn score_from_value(value: &Value) -> Option<u8> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches("/100").trim().parse().ok()?,
        _ => return None,
    };

    if !raw.is_finite() {
        return None;
    }

    Some(raw.round().clamp(1.0, 100.0) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{Reply, ScriptedLlm};
    use crate::models::SpendingPatterns;
    use std::collections::BTreeMap;

    fn sample_analysis(total: f64) -> ExpenditureAnalysis {
        let mut breakdown = BTreeMap::new();
        breakdown.insert("rent".to_string(), total * 0.75);
        breakdown.insert("food".to_string(), total * 0.25);
        ExpenditureAnalysis {
            total_spending: total,
            category_breakdown: breakdown,
            spending_patterns: SpendingPatterns {
                avg_transaction: total / 2.0,
                highest_category: "rent".to_string(),
                transaction_count: 2,
                categories_count: 2,
            },
            analysis_summary: "Mostly rent.".to_string(),
        }
    }

    #[test]
    fn test_parse_fenced_json() {
        let reply = r#"Sure! Here you go:
```json
{"insights": ["Rent is high"], "recommendations": ["Move", "Cook"], "financial_score": 72, "summary": "Okay"}
```"#;
        let parsed = parse_insights(reply);
        assert_eq!(parsed.insights, vec!["Rent is high"]);
        assert_eq!(parsed.recommendations.len(), 2);
        assert_eq!(parsed.financial_score, 72);
        assert_eq!(parsed.summary, "Okay");
    }

    #[test]
    fn test_parse_missing_fields_default() {
        let parsed = parse_insights(r#"{"insights": ["one"]}"#);
        assert_eq!(parsed.insights, vec!["one"]);
        assert!(parsed.recommendations.is_empty());
        assert_eq!(parsed.financial_score, 50);
        assert_eq!(parsed.summary, "Analysis completed");
    }

    #[test]
    fn test_parse_clamps_and_coerces_score() {
        assert_eq!(parse_insights(r#"{"financial_score": 140}"#).financial_score, 100);
        assert_eq!(parse_insights(r#"{"financial_score": 0}"#).financial_score, 1);
        assert_eq!(parse_insights(r#"{"financial_score": "65/100"}"#).financial_score, 65);
        assert_eq!(parse_insights(r#"{"financial_score": 81.6}"#).financial_score, 82);
    }

    #[test]
    fn test_parse_non_finite_score_uses_default() {
        for raw in ["NaN", "inf", "-infinity"] {
            let reply = format!(r#"{{"financial_score": "{}"}}"#, raw);
            let score = parse_insights(&reply).financial_score;
            assert_eq!(score, 50, "score for {}", raw);
            assert!((1..=100).contains(&score));
        }
    }

    #[test]
    fn test_parse_garbage() {
        for reply in ["no json here", "} backwards {", "{not: valid}"] {
            let parsed = parse_insights(reply);
            assert_eq!(parsed.insights, vec!["Unable to parse AI response"]);
            assert_eq!(parsed.recommendations, vec!["Please try again"]);
            assert_eq!(parsed.financial_score, 50);
            assert_eq!(parsed.summary, "Error processing AI response");
        }
    }

    #[test]
    fn test_fallback_score_bounds() {
        assert_eq!(fallback_score(0.0), 100);
        assert_eq!(fallback_score(2500.0), 75);
        assert_eq!(fallback_score(1050.0), 89);
        assert_eq!(fallback_score(50_000.0), 10);
    }

    #[test]
    fn test_fallback_insights_content() {
        let response = fallback_insights(&sample_analysis(2000.0));
        assert_eq!(response.insights[0], "Your total spending is $2000.00");
        assert_eq!(response.insights[1], "You have 2 spending categories");
        assert_eq!(response.insights[2], "Your highest spending category is rent");
        assert_eq!(response.recommendations.len(), 3);
        assert_eq!(response.financial_score, 80);
    }

    #[tokio::test]
    async fn test_generate_falls_back_on_llm_error() {
        let agent = InsightsAgent::new(Arc::new(ScriptedLlm::offline()));
        let response = agent.generate(&sample_analysis(1000.0), "").await;
        assert_eq!(response.summary, "Basic analysis completed with fallback insights");
        assert_eq!(response.financial_score, 90);
    }

    #[tokio::test]
    async fn test_generate_passes_user_context() {
        let llm = Arc::new(ScriptedLlm::new([Reply::Text(
            r#"{"insights": [], "recommendations": [], "financial_score": 60, "summary": "fine"}"#.into(),
        )]));
        let agent = InsightsAgent::new(llm.clone());

        let response = agent.generate(&sample_analysis(1000.0), "saving for a car").await;

        assert_eq!(response.financial_score, 60);
        let system = llm.prompts()[0].system.clone().unwrap();
        assert!(system.contains("User Context: saving for a car"));
    }
}
