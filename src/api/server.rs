//! Router construction and server loop.

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::cors::{Any, CorsLayer};

use crate::api::handlers;
use crate::error::Result;
use crate::models::ServerConfig;
use crate::pipeline::Aggregator;

/// Shared state for handlers. The aggregator is read-only.
#[derive(Clone)]
pub struct ApiState {
    pub aggregator: Arc<Aggregator>,
}

impl ApiState {
    pub fn new(aggregator: Aggregator) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
        }
    }
}

/// Build the API router with permissive CORS for the mobile client.
pub fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::home))
        .route("/api/ipos", get(handlers::all_ipos))
        .route("/api/ipos/current", get(handlers::current_ipos))
        .route("/api/ipos/upcoming", get(handlers::upcoming_ipos))
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(cors)
}

/// Serve the API until Ctrl-C.
pub async fn serve(config: &ServerConfig, state: ApiState) -> Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    log::info!("IPO feed API listening on http://{}", listener.local_addr()?);
    log::info!("  GET /");
    log::info!("  GET /api/ipos");
    log::info!("  GET /api/ipos/current");
    log::info!("  GET /api/ipos/upcoming");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    log::info!("Shutdown signal received");
}
