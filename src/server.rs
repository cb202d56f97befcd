use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::routes;
use crate::state::AppState;

/// Install the global subscriber; `RUST_LOG` wins over `default_filter`
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    // A second call (tests, embedded use) keeps the first subscriber
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Build state from `config`, bind, and serve until Ctrl-C
pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    tracing::info!("Starting FreeFlow API in {:?} mode", config.environment);

    if crate::is_production!() {
        if config.security.jwt_secret.is_empty() {
            anyhow::bail!("SECURITY_JWT_SECRET must be set in production");
        }
        if config.demo.enabled {
            tracing::warn!("Demo mode is enabled in production; demo requests read the shared demo tenant");
        }
    }

    let bind_addr = config.bind_addr();
    let state = AppState::from_config(config)
        .await
        .context("failed to initialise record store")?;
    tracing::info!("Record store: {}", state.store.backend());

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("FreeFlow API listening on http://{}", bind_addr);

    axum::serve(listener, routes::app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

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
