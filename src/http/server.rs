//! HTTP server setup and the relay handler.
//!
//! # Responsibilities
//! - Create Axum Router with the single wildcard relay route
//! - Wire up middleware (request ID, tracing)
//! - Bind server to listener and stop on the shutdown signal
//! - Relay each request: validate target, call upstream, build reply
//!
//! # Design Decisions
//! - One shared upstream client for the whole process (connection pooling)
//! - Handler state is immutable; requests share nothing mutable
//! - Client disconnects drop the handler future, which aborts the upstream call

use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{header::InvalidHeaderValue, request::Parts, Method, Request},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::RelayConfig;
use crate::http::client::build_client;
use crate::http::error::RelayError;
use crate::http::request::{
    parse_target, request_id, requested_target, MakeRelayRequestId, OutboundPolicy, X_REQUEST_ID,
};
use crate::http::response::build_reply;
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;
use crate::security::CorsPolicy;

/// Errors raised while assembling the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid relay header value: {0}")]
    Header(#[from] InvalidHeaderValue),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub client: reqwest::Client,
    pub outbound: OutboundPolicy,
    pub cors: CorsPolicy,
    /// Log every target URL at info level.
    pub verbose: bool,
}

impl AppState {
    pub fn from_config(config: &RelayConfig) -> Result<Self, ServerError> {
        Ok(Self {
            client: build_client(&config.timeouts, &config.upstream)?,
            outbound: OutboundPolicy::from_options(&config.relay)?,
            cors: CorsPolicy::from_options(&config.relay)?,
            verbose: config.observability.verbose,
        })
    }
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RelayConfig) -> Result<Self, ServerError> {
        let state = AppState::from_config(&config)?;
        let router = build_router(state);
        Ok(Self { router, config })
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            full_cors_headers = self.config.relay.full_cors_headers(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.recv())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", any(relay_handler))
        .route("/{*path}", any(relay_handler))
        .with_state(state)
        .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRelayRequestId))
}

/// Relay one request to the target named by `u`.
///
/// Any method is accepted and relayed as GET; the inbound body is ignored.
async fn relay_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let (parts, _body) = request.into_parts();

    if parts.method != Method::GET {
        tracing::debug!(
            request_id = %request_id(&parts.headers),
            method = %parts.method,
            "Relaying non-GET request as GET"
        );
    }

    match relay(&state, &parts).await {
        Ok(reply) => {
            metrics::record_request(reply.status().as_u16(), "relayed", start_time);
            reply
        }
        Err(e) => {
            let status = e.status();
            let target_url = e.target().unwrap_or_default();
            if status.is_server_error() {
                tracing::error!(request_id = %request_id(&parts.headers), kind = e.kind(), error = %e, "Relay failed");
            } else {
                tracing::warn!(request_id = %request_id(&parts.headers), kind = e.kind(), target_url = %target_url, error = %e, "Rejected relay request");
            }
            metrics::record_request(status.as_u16(), e.kind(), start_time);

            let mut response = e.into_response();
            state.cors.apply(&parts.headers, response.headers_mut());
            response
        }
    }
}

async fn relay(state: &AppState, parts: &Parts) -> Result<Response, RelayError> {
    let requested = requested_target(&parts.uri);
    let requested_url = requested.as_deref().unwrap_or_default();

    // Logged before validation so rejected targets show up too.
    if state.verbose {
        tracing::info!(request_id = %request_id(&parts.headers), target_url = %requested_url, "Target requested");
    } else {
        tracing::debug!(request_id = %request_id(&parts.headers), target_url = %requested_url, "Target requested");
    }

    let target = parse_target(requested.as_deref())?;

    let outbound = state
        .client
        .get(target.clone())
        .headers(state.outbound.headers(&parts.headers))
        .build()
        .map_err(RelayError::from_client)?;

    let upstream = state
        .client
        .execute(outbound)
        .await
        .map_err(RelayError::from_client)?;

    tracing::debug!(
        request_id = %request_id(&parts.headers),
        target_url = %target,
        status = %upstream.status(),
        "Upstream responded"
    );

    Ok(build_reply(upstream, &state.cors, &parts.headers, &target))
}
