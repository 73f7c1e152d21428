//! Core data models for the gateway
//!
//! Every type here is a transient request/response payload.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

//
// ================= Query Type =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    ExpenditureAnalysis,
    InsightsGeneration,
    TaxAdvice,
    InvestmentAdvice,
    RevenueAnalysis,
    GeneralChat,
}

impl QueryType {
    pub const ALL: [QueryType; 6] = [
        QueryType::ExpenditureAnalysis,
        QueryType::InsightsGeneration,
        QueryType::TaxAdvice,
        QueryType::InvestmentAdvice,
        QueryType::RevenueAnalysis,
        QueryType::GeneralChat,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::ExpenditureAnalysis => "expenditure_analysis",
            QueryType::InsightsGeneration => "insights_generation",
            QueryType::TaxAdvice => "tax_advice",
            QueryType::InvestmentAdvice => "investment_advice",
            QueryType::RevenueAnalysis => "revenue_analysis",
            QueryType::GeneralChat => "general_chat",
        }
    }

    /// Parse a label as an LLM tends to emit it: `"Tax_Advice".` → `TaxAdvice`
    pub fn from_label(raw: &str) -> Option<Self> {
        let cleaned = raw
            .trim()
            .trim_matches(|c: char| !c.is_ascii_alphanumeric() && c != '_')
            .to_lowercase();

        Self::ALL.into_iter().find(|t| t.as_str() == cleaned)
    }

    pub fn is_advice(&self) -> bool {
        matches!(
            self,
            QueryType::TaxAdvice | QueryType::InvestmentAdvice | QueryType::RevenueAnalysis
        )
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ================= Expenditure =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpenditureEntry {
    pub amount: f64,
    pub category: String,
    pub description: String,
    #[serde(with = "flexible_date")]
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpendingPatterns {
    pub avg_transaction: f64,
    pub highest_category: String,
    pub transaction_count: usize,
    pub categories_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpenditureAnalysis {
    pub total_spending: f64,
    pub category_breakdown: BTreeMap<String, f64>,
    pub spending_patterns: SpendingPatterns,
    pub analysis_summary: String,
}

//
// ================= Insights =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightRequest {
    pub analysis_data: ExpenditureAnalysis,
    #[serde(default)]
    pub user_context: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InsightResponse {
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
    pub financial_score: u8,
    pub summary: String,
}

//
// ================= Chat =================
//

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub user_context: Option<String>,
    #[serde(default)]
    pub expenditure_data: Option<Vec<ExpenditureEntry>>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_context(mut self, user_context: impl Into<String>) -> Self {
        self.user_context = Some(user_context.into());
        self
    }

    pub fn with_expenditures(mut self, entries: Vec<ExpenditureEntry>) -> Self {
        self.expenditure_data = Some(entries);
        self
    }

    pub fn context(&self) -> &str {
        self.user_context.as_deref().unwrap_or("")
    }

    /// Expenditure entries, only when at least one was supplied
    pub fn expenditures(&self) -> Option<&[ExpenditureEntry]> {
        self.expenditure_data
            .as_deref()
            .filter(|entries| !entries.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub query_type: QueryType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ChatResponse {
    pub fn text(response: impl Into<String>, query_type: QueryType) -> Self {
        Self {
            response: response.into(),
            query_type,
            data: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullAnalysisRequest {
    pub entries: Vec<ExpenditureEntry>,
    #[serde(default)]
    pub user_context: String,
}

//
// ================= Date Handling =================
//

/// Accepts RFC 3339, naive `YYYY-MM-DDTHH:MM:SS[.f]` and bare `YYYY-MM-DD`
mod flexible_date {
    use super::*;
    use serde::{de, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&date.to_rfc3339())
    }

    // Numbers above this are taken as milliseconds since the epoch
    const MILLIS_THRESHOLD: f64 = 2e10;

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        d.deserialize_any(DateVisitor)
    }

    struct DateVisitor;

    impl<'de> de::Visitor<'de> for DateVisitor {
        type Value = DateTime<Utc>;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            f.write_str("a date string or a Unix timestamp")
        }

        fn visit_str<E: de::Error>(self, raw: &str) -> Result<Self::Value, E> {
            parse(raw).ok_or_else(|| E::custom(format!("invalid date: {}", raw)))
        }

        fn visit_i64<E: de::Error>(self, ts: i64) -> Result<Self::Value, E> {
            self.visit_f64(ts as f64)
        }

        fn visit_u64<E: de::Error>(self, ts: u64) -> Result<Self::Value, E> {
            self.visit_f64(ts as f64)
        }

        fn visit_f64<E: de::Error>(self, ts: f64) -> Result<Self::Value, E> {
            from_unix(ts).ok_or_else(|| E::custom(format!("invalid timestamp: {}", ts)))
        }
    }

    fn from_unix(ts: f64) -> Option<DateTime<Utc>> {
        if !ts.is_finite() {
            return None;
        }
        let millis = if ts.abs() > MILLIS_THRESHOLD { ts } else { ts * 1000.0 };
        DateTime::from_timestamp_millis(millis.round() as i64)
    }

    pub(super) fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }

        for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
                return Some(naive.and_utc());
            }
        }

        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }
}
