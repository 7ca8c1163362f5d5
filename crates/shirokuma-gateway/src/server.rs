// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};
use shirokuma_agent::Dispatcher;
use shirokuma_core::ShirokumaError;
use tokio_util::sync::CancellationToken;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{ChannelSecret, MAX_BODY_BYTES, line_signature};
use crate::forward::SecondaryForwarder;
use crate::handlers;

/// Upper bound on requests handled at once.
const MAX_CONCURRENT_REQUESTS: usize = 64;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub dispatcher: Arc<Dispatcher>,
    pub forwarder: Option<Arc<SecondaryForwarder>>,
    /// Process start time for uptime reporting.
    pub started: Instant,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Builds the application router.
///
/// - POST /webhook (signature checked)
/// - POST /webhook/form
/// - GET / and GET /health
pub fn router(state: GatewayState, secret: ChannelSecret) -> Router {
    let webhook_routes = Router::new()
        .route("/webhook", post(handlers::post_webhook))
        .route_layer(axum_middleware::from_fn_with_state(secret, line_signature))
        .with_state(state.clone());

    let public_routes = Router::new()
        .route("/webhook/form", post(handlers::post_form))
        .route("/", get(handlers::get_status))
        .route("/health", get(handlers::get_status))
        .with_state(state);

    Router::new()
        .merge(webhook_routes)
        .merge(public_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(ConcurrencyLimitLayer::new(MAX_CONCURRENT_REQUESTS))
        .layer(TraceLayer::new_for_http())
}

/// Serves `app` until `shutdown` is cancelled.
pub async fn start_server(
    config: &ServerConfig,
    app: Router,
    shutdown: CancellationToken,
) -> Result<(), ShirokumaError> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ShirokumaError::Channel {
            message: format!("failed to bind {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| ShirokumaError::Channel {
            message: format!("server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("server stopped accepting requests");
    Ok(())
}
