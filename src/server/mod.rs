//! AI proxy server
//!
//! HTTP front for [`CommandInterpreter`](crate::ai::CommandInterpreter),
//! called by the extension and by [`ProxyClient`](crate::cleanup::ProxyClient).

pub mod routes;
pub mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tracing::{info, warn};

use crate::ai::CommandInterpreter;
use crate::error::Result;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub interpreter: Arc<CommandInterpreter>,
}

/// Build the proxy router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ai/parse", post(routes::parse_command))
        .route("/ai/suggestReplies", post(routes::suggest_replies))
        .route("/ai/analyze", post(routes::analyze_emails))
        .route("/health", get(routes::health))
        .with_state(state)
}

/// Serve the proxy until Ctrl+C
pub async fn serve(state: AppState, port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("AI proxy listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for ctrl+c: {}", e);
        std::future::pending::<()>().await;
    }
    warn!("received ctrl+c, shutting down");
}
