use beadshop_storefront::api::{self, AppState};
use beadshop_storefront::config::AppConfig;
use beadshop_storefront::logging::init_tracing_with;
use beadshop_storefront::payments::client::CheckoutClient;
use dotenv::dotenv;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = AppConfig::from_env()?;
    init_tracing_with(&config.logging);
    config.validate()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        backend = %config.backend.api_url,
        poll_timeout_ms = config.polling.timeout_ms,
        "🚀 Starting beadshop storefront"
    );

    let client = CheckoutClient::new(&config.backend.api_url, config.backend.timeout())
        .map_err(|e| {
            error!(error = %e, "❌ Invalid checkout backend URL");
            anyhow::anyhow!(e)
        })?;

    let state = AppState::new(
        client,
        config.polling.poller_config(),
        config.routes.clone(),
    );
    let app = api::router(state);

    info!("✅ Routes configured");

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        error!("❌ Failed to bind to address {}: {}", addr, e);
        e
    })?;

    info!(
        address = %addr,
        success = %config.routes.success_path,
        cancelled = %config.routes.cancelled_path,
        error = %config.routes.error_path,
        "🚀 Server listening on http://{}",
        addr
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server shutdown complete");

    Ok(())
}
