//! HTTP Server
//!
//! Builds the router and runs it until shutdown.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::engine::Engine;
use crate::error::Result;

/// Router with every gateway route, sharing one engine
pub fn router(engine: Arc<Engine>) -> Router {
    Router::new()
        .route("/oaipmh/all", get(handlers::global_get).post(handlers::global_post))
        .route(
            "/oaipmh/repo/{repo_id}",
            get(handlers::repository_get).post(handlers::repository_post),
        )
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(engine)
}

/// Bind `addr` and serve until `shutdown` resolves
#[tracing::instrument(level = "info", skip_all, fields(addr = %addr))]
pub async fn serve<F>(addr: SocketAddr, engine: Arc<Engine>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(engine))
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
