use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use globalspeak::config::Config;
use globalspeak::db::Database;
use globalspeak::services::PaymentService;
use globalspeak::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "globalspeak=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load()?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let db = Database::connect(&config.database_url, config.max_connections).await?;
    db.run_migrations().await?;
    tracing::info!("Database initialized");

    // Initialize payment processor client
    let payments = PaymentService::new(&config)?;
    if payments.is_mock_mode() {
        tracing::warn!("Running in MOCK payment mode - set payment.secret_key for real charges");
    } else {
        tracing::info!("Payment processor configured ({})", payments.currency());
    }

    // Create shared application state
    let state = Arc::new(AppState {
        db,
        payments,
        config: config.clone(),
    });

    let app = globalspeak::app(state);

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Resolves on Ctrl+C
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
