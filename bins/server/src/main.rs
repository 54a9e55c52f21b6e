//! Stockledger API Server
//!
//! Main entry point for the stock ledger service.

mod seed;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stockledger_api::{AppState, create_router};
use stockledger_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stockledger=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load()?;

    // Build the engine and seed the catalog
    let ledger = seed::build_ledger(&config.ledger, &config.seed)?;
    info!(
        default_warehouse = %config.ledger.default_warehouse_code,
        "Stock ledger ready"
    );

    // Create router
    let state = AppState::new(ledger, config.ledger.notify_capacity);
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
