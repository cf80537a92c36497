// ABOUTME: HTTP server assembly and lifecycle for the MoveID service
// ABOUTME: Merges domain routers, applies tracing, request-id, CORS, timeout and body-limit layers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MoveID

//! # HTTP Server
//!
//! [`build_router`] is used by the binary and by integration tests, so tests
//! exercise the same middleware stack as production.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{body::Body, extract::DefaultBodyLimit, http::Request, Router};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{info, info_span, Level};

use crate::config::{CorsConfig, ServerConfig};
use crate::middleware::setup_cors;
use crate::resources::ServerResources;
use crate::routes::{AnalysisRoutes, HealthRoutes, ReportRoutes, REQUEST_ID_HEADER};

/// Upper bound for one request, vision round trip included
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Build the application router with every middleware layer
pub fn build_router(resources: Arc<ServerResources>, cors: &CorsConfig) -> Router {
    // oversized uploads must reach the handler to be rejected with the limit message
    let body_limit = resources.limits.body_limit().saturating_mul(2);

    Router::new()
        .merge(HealthRoutes::routes(Arc::clone(&resources)))
        .merge(AnalysisRoutes::routes(Arc::clone(&resources)))
        .merge(ReportRoutes::routes(resources))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(|request: &Request<Body>| {
                            let request_id = request
                                .headers()
                                .get(REQUEST_ID_HEADER)
                                .and_then(|value| value.to_str().ok())
                                .unwrap_or("unknown");
                            info_span!(
                                "http_request",
                                method = %request.method(),
                                uri = %request.uri(),
                                request_id = %request_id,
                            )
                        })
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(setup_cors(cors))
                .layer(TimeoutLayer::new(REQUEST_TIMEOUT)),
        )
}

/// Bind and serve until a shutdown signal arrives
///
/// # Errors
///
/// Returns an error if resources cannot be built, the address cannot be
/// bound, or the server fails.
pub async fn serve(config: ServerConfig) -> Result<()> {
    info!("{}", config.summary());
    let resources = Arc::new(
        ServerResources::from_config(&config).context("Failed to initialize server resources")?,
    );
    let app = build_router(resources, &config.cors);

    let address = config.http.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!(address = %address, "MoveID server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("MoveID server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %error, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::warn!(error = %error, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutdown signal received");
}
