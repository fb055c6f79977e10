use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gradebook_server::api;
use gradebook_server::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up a local .env before reading configuration
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gradebook_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Gradebook Server...");

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    if config.github_token.is_none() {
        warn!("GITHUB_TOKEN not set; code host requests use the anonymous rate limit");
    }
    if config.oracle_api_key.is_none() {
        warn!("OPENROUTER_API_KEY not set; grading and question generation will fail");
    }
    info!(
        "Oracle model: {}, max concurrent entries: {}, request timeout: {:?}",
        config.oracle_model, config.max_concurrent_entries, config.request_timeout
    );

    // Build router with all API endpoints
    let state = api::AppState::from_config(&config)?;
    let app = api::create_router(state);

    info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
