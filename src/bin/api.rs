use financial_ai_gateway::{
    agent::MasterAgent,
    api::start_server,
    config::Config,
    llm::GroqClient,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    let config = Config::from_env()?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if config.groq.api_key.is_empty() {
        warn!("GROQ_API_KEY not set, every answer will use the offline fallbacks");
    }

    info!("Financial AI Gateway - API Server");
    info!("Model: {}", config.groq.model);
    info!("Bind: {}", config.bind_addr());

    let llm = Arc::new(GroqClient::new(&config.groq)?);
    let agent = Arc::new(MasterAgent::new(llm));

    info!("Master agent initialized");

    start_server(agent, &config.bind_addr()).await?;

    Ok(())
}
