//! Process configuration
//!
//! Read once at start-up from the environment (and `.env` when present).

use crate::error::AdvisorError;
use crate::Result;
use std::str::FromStr;

pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

#[derive(Debug, Clone)]
pub struct GroqConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: 0.3,
            max_tokens: 1024,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub groq: GroqConfig,
    pub host: String,
    pub port: u16,
}

impl Config {
    /// Load `.env` (if any) and read the process environment
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = GroqConfig::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let groq = GroqConfig {
            api_key: get("GROQ_API_KEY").unwrap_or_default(),
            model: get("GROQ_MODEL").unwrap_or(defaults.model),
            base_url: get("GROQ_BASE_URL")
                .unwrap_or(defaults.base_url)
                .trim_end_matches('/')
                .to_string(),
            temperature: parse_var("GROQ_TEMPERATURE", get("GROQ_TEMPERATURE"), defaults.temperature)?,
            max_tokens: parse_var("GROQ_MAX_TOKENS", get("GROQ_MAX_TOKENS"), defaults.max_tokens)?,
            timeout_secs: parse_var("GROQ_TIMEOUT_SECS", get("GROQ_TIMEOUT_SECS"), defaults.timeout_secs)?,
        };

        let port_raw = get("PORT").or_else(|| get("API_PORT"));

        Ok(Self {
            groq,
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_var("PORT", port_raw, 8000)?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: FromStr>(name: &str, raw: Option<String>, default: T) -> Result<T> {
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| {
            AdvisorError::Config(format!("{} has an invalid value: {:?}", name, value))
        }),
    }
}
