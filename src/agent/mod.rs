//! Master agent - classifies a chat request and dispatches it
//!
//! INPUT → CLASSIFY → HANDLER (analysis | insights | advice | chat) → RESPONSE
//!
//! Every handler absorbs LLM failures with a fallback, so `process` always
//! produces a response labelled with the classified query type.

use crate::analysis::ExpenditureAnalyzer;
use crate::classifier::QueryClassifier;
use crate::insights::InsightsAgent;
use crate::llm::LlmClient;
use crate::models::{
    ChatRequest, ChatResponse, ExpenditureAnalysis, ExpenditureEntry, InsightResponse, QueryType,
};
use crate::prompts;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

pub struct MasterAgent {
    llm: Arc<dyn LlmClient>,
    analyzer: ExpenditureAnalyzer,
    insights: InsightsAgent,
}

impl MasterAgent {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            analyzer: ExpenditureAnalyzer::new(llm.clone()),
            insights: InsightsAgent::new(llm.clone()),
            llm,
        }
    }

    /// Main entry point
    pub async fn process(&self, request: &ChatRequest) -> ChatResponse {
        let span = info_span!("process", request_id = %Uuid::new_v4());

        async move {
            let started = Instant::now();
            let query_type = QueryClassifier::classify(self.llm.as_ref(), &request.message).await;
            info!(query_type = %query_type, "Routing request");

            let response = self.dispatch(request, query_type).await;

            info!(
                query_type = %response.query_type,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Request handled"
            );
            response
        }
        .instrument(span)
        .await
    }

    /// Insights for an analysis the caller already holds (skips classification)
    pub async fn insights_for(
        &self,
        analysis: &ExpenditureAnalysis,
        user_context: &str,
    ) -> ChatResponse {
        let span = info_span!("insights_for", request_id = %Uuid::new_v4());

        async move {
            let insights = self.insights.generate(analysis, user_context).await;
            ChatResponse {
                response: format_insights(&insights),
                query_type: QueryType::InsightsGeneration,
                data: Some(serde_json::json!({
                    "analysis": analysis,
                    "insights": insights,
                })),
            }
        }
        .instrument(span)
        .await
    }

    /// Run the handler for an already-classified request
    pub async fn dispatch(&self, request: &ChatRequest, query_type: QueryType) -> ChatResponse {
        match query_type {
            QueryType::ExpenditureAnalysis => match request.expenditures() {
                Some(entries) => self.handle_expenditure_analysis(entries).await,
                None => ChatResponse::text(prompts::MISSING_DATA_REPLY, query_type),
            },
            QueryType::InsightsGeneration => self.handle_insights(request).await,
            QueryType::TaxAdvice | QueryType::InvestmentAdvice | QueryType::RevenueAnalysis => {
                self.handle_advice(request, query_type).await
            }
            QueryType::GeneralChat => self.handle_general_chat(request).await,
        }
    }

    async fn handle_expenditure_analysis(&self, entries: &[ExpenditureEntry]) -> ChatResponse {
        let analysis = self.analyzer.analyze(entries).await;

        ChatResponse {
            response: format_analysis(&analysis),
            query_type: QueryType::ExpenditureAnalysis,
            data: serde_json::to_value(&analysis).ok(),
        }
    }

    async fn handle_insights(&self, request: &ChatRequest) -> ChatResponse {
        if let Some(entries) = request.expenditures() {
            let analysis = self.analyzer.analyze(entries).await;
            let insights = self.insights.generate(&analysis, request.context()).await;

            return ChatResponse {
                response: format_insights(&insights),
                query_type: QueryType::InsightsGeneration,
                data: Some(serde_json::json!({
                    "analysis": analysis,
                    "insights": insights,
                })),
            };
        }

        let prompt = prompts::insights_without_data(&request.message, request.context());
        self.complete_or(prompt, QueryType::InsightsGeneration, prompts::INSIGHTS_FALLBACK)
            .await
    }

    async fn handle_advice(&self, request: &ChatRequest, query_type: QueryType) -> ChatResponse {
        let fallback = prompts::advice_fallback(query_type);

        match prompts::advice(query_type, &request.message, request.context()) {
            Some(prompt) => self.complete_or(prompt, query_type, fallback).await,
            None => ChatResponse::text(fallback, query_type),
        }
    }

    async fn handle_general_chat(&self, request: &ChatRequest) -> ChatResponse {
        let prompt = prompts::general_chat(&request.message, request.context());
        self.complete_or(prompt, QueryType::GeneralChat, prompts::GENERAL_CHAT_FALLBACK)
            .await
    }

    async fn complete_or(
        &self,
        prompt: crate::llm::Prompt,
        query_type: QueryType,
        fallback: &str,
    ) -> ChatResponse {
        match self.llm.complete(&prompt).await {
            Ok(answer) => ChatResponse::text(answer, query_type),
            Err(e) => {
                warn!(query_type = %query_type, "LLM call failed, using fallback: {}", e);
                ChatResponse::text(fallback, query_type)
            }
        }
    }
}

fn format_analysis(analysis: &ExpenditureAnalysis) -> String {
    let top = match analysis.spending_patterns.highest_category.as_str() {
        "" => "N/A",
        category => category,
    };

    format!(
        "I've analyzed your expenditure data:\n\n\
         • Total Spending: ${:.2}\n\
         • Categories: {}\n\
         • Top Category: {}\n\n\
         {}",
        analysis.total_spending,
        analysis.category_breakdown.len(),
        top,
        analysis.analysis_summary
    )
}

fn format_insights(insights: &InsightResponse) -> String {
    let mut out = String::from("Based on your spending data, here are my insights:\n\n");

    let _ = write!(out, "**Financial Score: {}/100**\n\n", insights.financial_score);

    out.push_str("**Key Insights:**\n");
    for insight in &insights.insights {
        let _ = writeln!(out, "• {}", insight);
    }

    out.push_str("\n**Recommendations:**\n");
    for rec in &insights.recommendations {
        let _ = writeln!(out, "• {}", rec);
    }

    let _ = write!(out, "\n{}", insights.summary);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{Reply, ScriptedLlm};
    use chrono::Utc;

    fn entries() -> Vec<ExpenditureEntry> {
        vec![
            ExpenditureEntry {
                amount: 1500.0,
                category: "rent".to_string(),
                description: "March rent".to_string(),
                date: Utc::now(),
            },
            ExpenditureEntry {
                amount: 500.0,
                category: "food".to_string(),
                description: "Groceries".to_string(),
                date: Utc::now(),
            },
        ]
    }

    fn agent_with(replies: Vec<Reply>) -> (MasterAgent, Arc<ScriptedLlm>) {
        let llm = Arc::new(ScriptedLlm::new(replies));
        (MasterAgent::new(llm.clone()), llm)
    }

    fn text(s: &str) -> Reply {
        Reply::Text(s.to_string())
    }

    #[tokio::test]
    async fn test_expenditure_without_data_asks_for_it() {
        let (agent, llm) = agent_with(vec![text("expenditure_analysis")]);

        let response = agent.process(&ChatRequest::new("Analyze my spending")).await;

        assert_eq!(response.query_type, QueryType::ExpenditureAnalysis);
        assert_eq!(response.response, prompts::MISSING_DATA_REPLY);
        assert!(response.data.is_none());
        assert_eq!(llm.prompts().len(), 1);
    }

    #[tokio::test]
    async fn test_expenditure_with_data() {
        let (agent, _) = agent_with(vec![text("expenditure_analysis"), text("Rent is 75% of it.")]);
        let request = ChatRequest::new("Analyze my spending").with_expenditures(entries());

        let response = agent.process(&request).await;

        assert_eq!(response.query_type, QueryType::ExpenditureAnalysis);
        assert!(response.response.contains("• Total Spending: $2000.00"));
        assert!(response.response.contains("• Categories: 2"));
        assert!(response.response.contains("• Top Category: rent"));
        assert!(response.response.ends_with("Rent is 75% of it."));

        let data = response.data.unwrap();
        assert_eq!(data["total_spending"], 2000.0);
        assert_eq!(data["spending_patterns"]["transaction_count"], 2);
    }

    #[tokio::test]
    async fn test_insights_with_data_runs_full_pipeline() {
        let (agent, llm) = agent_with(vec![
            text("insights_generation"),
            text("Housing heavy."),
            text(r#"{"insights": ["Rent is 75%"], "recommendations": ["Find a roommate"], "financial_score": 64, "summary": "Manageable"}"#),
        ]);
        let request = ChatRequest::new("Give me insights")
            .with_context("student")
            .with_expenditures(entries());

        let response = agent.process(&request).await;

        assert_eq!(response.query_type, QueryType::InsightsGeneration);
        assert!(response.response.contains("**Financial Score: 64/100**"));
        assert!(response.response.contains("• Rent is 75%"));
        assert!(response.response.contains("• Find a roommate"));
        assert!(response.response.ends_with("Manageable"));

        let data = response.data.unwrap();
        assert_eq!(data["analysis"]["analysis_summary"], "Housing heavy.");
        assert_eq!(data["insights"]["financial_score"], 64);

        let prompts = llm.prompts();
        assert_eq!(prompts.len(), 3);
        assert!(prompts[2].system.as_deref().unwrap().contains("User Context: student"));
    }

    #[tokio::test]
    async fn test_insights_without_data_uses_chat_prompt() {
        let (agent, llm) = agent_with(vec![text("insights_generation"), text("Save 20%.")]);

        let response = agent.process(&ChatRequest::new("Any recommendations?")).await;

        assert_eq!(response.query_type, QueryType::InsightsGeneration);
        assert_eq!(response.response, "Save 20%.");
        assert!(llm.prompts()[1].user.contains("asking for financial insights"));
    }

    #[tokio::test]
    async fn test_advice_template_per_type() {
        for (label, query_type, role) in [
            ("tax_advice", QueryType::TaxAdvice, "tax advisor"),
            ("investment_advice", QueryType::InvestmentAdvice, "investment advisor"),
            ("revenue_analysis", QueryType::RevenueAnalysis, "revenue analysis"),
        ] {
            let (agent, llm) = agent_with(vec![text(label), text("advice")]);

            let response = agent.process(&ChatRequest::new("question")).await;

            assert_eq!(response.query_type, query_type);
            assert_eq!(response.response, "advice");
            assert!(llm.prompts()[1].system.as_deref().unwrap().contains(role));
        }
    }

    #[tokio::test]
    async fn test_advice_fallback_on_failure() {
        let (agent, _) = agent_with(vec![text("tax_advice"), Reply::Fail("timeout".into())]);

        let response = agent.process(&ChatRequest::new("How do deductions work?")).await;

        assert_eq!(response.query_type, QueryType::TaxAdvice);
        assert_eq!(response.response, prompts::advice_fallback(QueryType::TaxAdvice));
    }

    #[tokio::test]
    async fn test_offline_general_chat_fallback() {
        let agent = MasterAgent::new(Arc::new(ScriptedLlm::offline()));

        let response = agent.process(&ChatRequest::new("hello there")).await;

        assert_eq!(response.query_type, QueryType::GeneralChat);
        assert_eq!(response.response, prompts::GENERAL_CHAT_FALLBACK);
    }

    #[tokio::test]
    async fn test_offline_insights_with_data_uses_rules() {
        let agent = MasterAgent::new(Arc::new(ScriptedLlm::offline()));
        let request = ChatRequest::new("Give me tips").with_expenditures(entries());

        let response = agent.process(&request).await;

        assert_eq!(response.query_type, QueryType::InsightsGeneration);
        assert!(response.response.contains("**Financial Score: 80/100**"));
        assert!(response.response.contains("Basic analysis completed with fallback insights"));
    }

    #[tokio::test]
    async fn test_insights_for_existing_analysis() {
        let (agent, llm) = agent_with(vec![text(
            r#"{"insights": ["a"], "recommendations": ["b"], "financial_score": 70, "summary": "ok"}"#,
        )]);
        let (total, breakdown, patterns) = crate::analysis::compute(&entries());
        let analysis = ExpenditureAnalysis {
            total_spending: total,
            category_breakdown: breakdown,
            spending_patterns: patterns,
            analysis_summary: "Rent heavy.".to_string(),
        };

        let response = agent.insights_for(&analysis, "").await;

        assert_eq!(response.query_type, QueryType::InsightsGeneration);
        assert!(response.response.contains("**Financial Score: 70/100**"));
        assert_eq!(llm.prompts().len(), 1);
    }

    #[test]
    fn test_format_analysis_without_top_category() {
        let (total, breakdown, patterns) = crate::analysis::compute(&[]);
        let analysis = ExpenditureAnalysis {
            total_spending: total,
            category_breakdown: breakdown,
            spending_patterns: patterns,
            analysis_summary: "Nothing yet.".to_string(),
        };
        assert!(format_analysis(&analysis).contains("• Top Category: N/A"));
    }
}
