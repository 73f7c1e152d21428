//! LLM client trait and implementations
//!
//! The gateway only ever needs "send a prompt, get text back". Everything
//! above this layer treats a failed completion as a signal to fall back.

use crate::error::AdvisorError;
use crate::Result;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

pub mod groq;
pub use groq::GroqClient;

/// A single-turn prompt: optional system message plus the user message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: Option<String>,
    pub user: String,
}

impl Prompt {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            system: None,
            user: text.into(),
        }
    }

    pub fn with_system(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            user: user.into(),
        }
    }
}

/// Trait for text completion (provider controlled)
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &Prompt) -> Result<String>;
}

/// Scripted replies for a [`ScriptedLlm`]
#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    Fail(String),
}

/// Mock client for development & testing.
/// Replays queued replies in order and records every prompt it receives.
/// An exhausted script behaves like an unreachable provider.
#[derive(Default)]
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<Reply>>,
    prompts: Mutex<Vec<Prompt>>,
}

impl ScriptedLlm {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A client whose every call fails
    pub fn offline() -> Self {
        Self::default()
    }

    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.clone());
        }

        let next = self
            .replies
            .lock()
            .map_err(|_| AdvisorError::LlmError("scripted client poisoned".to_string()))?
            .pop_front();

        match next {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Fail(message)) => Err(AdvisorError::LlmError(message)),
            None => Err(AdvisorError::LlmError("no scripted reply left".to_string())),
        }
    }
}
