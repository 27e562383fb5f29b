//! HTTP front: `/mcp` (streamable HTTP) and `/health`.

use crate::server::HeroServer;
use crate::tools::Toolbox;
use anyhow::Context as _;
use axum::extract::State;
use axum::{Json, Router, routing::get};
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
};
use serde_json::{Value, json};
use std::net::SocketAddr;
use tokio::signal;

#[derive(Clone)]
struct HealthState {
    azure_configured: bool,
    ai_configured: bool,
}

async fn health(State(state): State<HealthState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "azure_configured": state.azure_configured,
        "ai_configured": state.ai_configured,
    }))
}

/// Routes for one shared [`Toolbox`]; each MCP session gets its own handler clone.
pub fn router(tools: Toolbox) -> Router {
    let health_state = HealthState {
        azure_configured: tools.azure_configured(),
        ai_configured: tools.ai_configured(),
    };

    let server = HeroServer::new(tools);
    let mcp = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig::default(),
    );

    Router::new()
        .route("/health", get(health))
        .with_state(health_state)
        .nest_service("/mcp", mcp)
}

/// Serve until SIGINT/SIGTERM.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(bind: SocketAddr, tools: Toolbox) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("bind {bind}"))?;
    let local = listener.local_addr().context("read bound address")?;
    tracing::info!(addr = %local, "hero MCP server listening (MCP at /mcp, health at /health)");

    axum::serve(listener, router(tools))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
