//! The `relay` binary: loads configuration, connects to Redis, builds the
//! provider router and the HTTP surface, and serves until a termination
//! signal arrives (§6).

use std::sync::Arc;

use relay_axum::{build_router, AppState};
use relay_core::Config;
use relay_providers::ProviderRouter;
use relay_queue::{KvGateway, WorkerRegistry};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Arc::new(Config::from_env()?);
    let gateway = Arc::new(KvGateway::connect(&config.redis_url()).await?);
    let registry = WorkerRegistry::new();
    let router = Arc::new(ProviderRouter::new(&config));

    let state = AppState::new(
        Arc::clone(&gateway),
        Arc::clone(&registry),
        Arc::clone(&router),
        Arc::clone(&config),
    );
    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(addr, "relay listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("relay shutting down");
    drop(gateway);
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
