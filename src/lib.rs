//! Financial AI Gateway
//!
//! An HTTP backend that answers personal-finance chat messages:
//! - Classifies each message into one of six query types
//! - Computes expenditure statistics locally when spending data is supplied
//! - Picks a prompt template for the query type and asks Groq for the answer
//! - Falls back to canned or rule-based answers when the LLM is unreachable
//!
//! PIPELINE:
//! HTTP → CLASSIFY → PROMPT → LLM → RESPONSE

pub mod agent;
pub mod analysis;
pub mod api;
pub mod classifier;
pub mod config;
pub mod error;
pub mod insights;
pub mod llm;
pub mod models;
pub mod prompts;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use agent::MasterAgent;
pub use classifier::QueryClassifier;
pub use config::Config;
