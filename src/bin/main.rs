use financial_ai_gateway::{agent::MasterAgent, config::Config, llm::GroqClient, ChatRequest};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// One-shot CLI: `advisor <message...>`
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    // Logs go to stderr so stdout carries only the answer
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let message = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if message.trim().is_empty() {
        eprintln!("usage: advisor <message>");
        std::process::exit(2);
    }

    let llm = Arc::new(GroqClient::new(&config.groq)?);
    let agent = MasterAgent::new(llm);

    info!(message = %message, "Running master agent");

    let response = agent.process(&ChatRequest::new(message)).await;

    println!("[{}]\n{}", response.query_type, response.response);
    Ok(())
}
