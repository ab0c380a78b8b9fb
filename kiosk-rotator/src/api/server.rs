//! HTTP server setup and routing

use crate::error::{Error, Result};
use crate::snapshot::DisplaySnapshot;
use axum::{routing::get, Router};
use kiosk_common::events::EventBus;
use std::future::Future;
use std::net::SocketAddr;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppContext {
    /// Latest display snapshot from the rotation runtime
    pub snapshots: watch::Receiver<DisplaySnapshot>,
    pub events: EventBus,
}

/// Build the router with all routes attached
pub fn create_router(ctx: AppContext) -> Router {
    Router::new()
        .route("/health", get(super::handlers::health))
        .route("/build_info", get(super::handlers::build_info))
        .route("/snapshot", get(super::handlers::snapshot))
        .route("/events", get(super::sse::event_stream))
        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
        // Renderer may be served from a different origin
        .layer(CorsLayer::permissive())
}

/// Serve the status API on `port` until `shutdown` resolves
pub async fn run<F>(port: u16, ctx: AppContext, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(ctx);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Http(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| Error::Http(format!("Server error: {}", e)))?;

    info!("HTTP server stopped");
    Ok(())
}
