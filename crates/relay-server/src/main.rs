//! HTTP server entry point.
//!
//! Loads configuration, optionally waits for Ollama to load the target model,
//! and starts the Axum server.

use std::sync::Arc;

use anyhow::Result;
use relay_config::RelayConfig;
use relay_llm::wait_until_ready;
use relay_server::{build_router, ServerState};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .compact()
        .init();

    let config = RelayConfig::from_env()?;
    info!(
        "Relaying to Ollama at {} (model: {})",
        config.ollama_host, config.model
    );

    let state = Arc::new(ServerState::new(config));
    check_ollama(&state).await;

    let app = build_router(state.clone());

    let addr = state.config.bind_addr.as_str();
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Logs Ollama's readiness before serving, waiting for it when configured to.
async fn check_ollama(state: &ServerState) {
    let config = &state.config;

    if config.wait_on_startup {
        info!(
            "Waiting up to {}s for Ollama to load {}",
            config.ready_timeout.as_secs(),
            config.model
        );
        let ready =
            wait_until_ready(state.probe.as_ref(), config.ready_interval, config.ready_timeout).await;
        if !ready {
            warn!("Ollama not ready, serving anyway; /health will report unhealthy");
        }
        return;
    }

    match state.probe.check().await {
        Ok(status) if status.is_ready() => {
            info!("Ollama ready ({} models listed)", status.models.unwrap_or(0));
        }
        Ok(status) => warn!(
            "Ollama not ready (is Ollama running? has {} been pulled?): {}",
            config.model,
            status.error.as_deref().unwrap_or("model not listed")
        ),
        Err(e) => warn!("Ollama check failed: {}", e),
    }
}
