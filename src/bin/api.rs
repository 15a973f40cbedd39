use market_query_agent::{api::start_server, AgentConfig, ReasoningAgent};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AgentConfig::from_env()?;

    info!("Market Query Agent - API Server");
    info!("Port: {}", config.port);
    info!(
        max_iterations = config.settings.max_iterations,
        timeout_secs = config.settings.timeout.as_secs(),
        call_quota = config.settings.call_quota,
        "Agent limits"
    );

    let agent = Arc::new(ReasoningAgent::from_config(&config)?);

    info!("Agent initialized");

    start_server(agent, config.port).await?;

    Ok(())
}
