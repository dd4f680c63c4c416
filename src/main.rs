use std::sync::Arc;

use support_desk_api::app::{app, AppState};
use support_desk_api::config;
use support_desk_api::database::{DatabaseManager, DocumentStore, MemoryStore, PgStore};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("support_desk_api=info,tower_http=info")),
        )
        .init();

    let config = config::config();
    tracing::info!("Starting Support Desk API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        tracing::warn!("JWT_SECRET is not set; every authenticated request will be rejected");
    }

    let store: Arc<dyn DocumentStore> = match config.database.url {
        Some(_) => {
            let pool = DatabaseManager::connect(&config.database).await?;
            DatabaseManager::ensure_schema(&pool).await?;
            Arc::new(PgStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store (data is lost on exit)");
            Arc::new(MemoryStore::new())
        }
    };

    let router = app(AppState::new(store), config);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Support Desk API listening on http://{}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
