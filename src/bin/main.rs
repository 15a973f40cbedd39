use market_query_agent::{AgentConfig, Query, ReasoningAgent};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let text = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    let query = Query::new(text);
    if query.is_blank() {
        eprintln!("usage: agent-cli <question>");
        std::process::exit(2);
    }

    let config = AgentConfig::from_env()?;
    let agent = ReasoningAgent::from_config(&config)?;

    info!(query = %query, "Running agent");

    match agent.run(&query).await {
        Ok(run) => {
            println!("{}", run.outcome.answer());
            println!("\nReasoning Trace ({} ms):", run.execution_time_ms);
            for (i, step) in run.trace.iter().enumerate() {
                println!("  {}: {}", i + 1, step);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("Agent failed: {}", e);
            Err(Box::new(e) as Box<dyn std::error::Error>)
        }
    }
}
