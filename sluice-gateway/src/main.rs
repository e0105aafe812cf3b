use std::sync::Arc;

use sluice_client::{BackendClient, IdentityClient};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;
pub mod config;
pub mod service;

#[cfg(test)]
mod testing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sluice_gateway=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Sluice Gateway...");

    let config = config::GatewayConfig::from_env()?;

    // Collaborators share one HTTP client with the outbound timeout
    let http = reqwest::Client::builder()
        .timeout(config.backend_timeout)
        .build()?;

    tracing::info!("Pipeline backend: {}", config.backend_url);
    tracing::info!("Identity service: {}", config.identity_url);

    let backend = Arc::new(BackendClient::with_client(&config.backend_url, http.clone()));
    let identity = Arc::new(IdentityClient::with_client(&config.identity_url, http));

    let shutdown = CancellationToken::new();
    let state = api::AppState::new(
        &config,
        backend,
        identity.clone(),
        identity,
        shutdown.clone(),
    );

    // Build router with all API endpoints
    let app = api::create_router(state, config.request_timeout);

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    tracing::info!("Sluice Gateway stopped");
    Ok(())
}

/// Resolve on Ctrl-C, cancelling in-flight decisions first
async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
    shutdown.cancel();
}
