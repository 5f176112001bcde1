//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the review and liveness routes
//! - Wire up middleware (request id, tracing, CORS, limits, timeout, auth)
//! - Bind the router to a listener and serve until shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::Request,
    middleware::{from_fn, from_fn_with_state},
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::auth::{jwt_middleware, JwtVerifier};
use crate::config::ProxyConfig;
use crate::http::health::health_routes;
use crate::http::request::{request_id_header, request_id_of, MakeRequestUuidV4};
use crate::lifecycle::shutdown;
use crate::observability::metrics;
use crate::review::upstream::ClientBuildError;
use crate::review::{review_routes, UpstreamClient};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub upstream: UpstreamClient,
    pub verifier: Arc<JwtVerifier>,
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to build upstream client: {0}")]
    Client(#[from] ClientBuildError),
}

/// HTTP server for the review proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, ServerError> {
        let state = AppState {
            upstream: UpstreamClient::new(&config.upstream)?,
            verifier: Arc::new(JwtVerifier::new(&config.auth)),
        };
        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        let cors = if config.security.cors_permissive {
            CorsLayer::permissive()
        } else {
            CorsLayer::new()
        };

        let reviews = review_routes()
            .route_layer(from_fn(metrics::track_requests))
            .layer(from_fn_with_state(state.verifier.clone(), jwt_middleware))
            .with_state(state);

        Router::new()
            .merge(health_routes::<()>())
            .merge(reviews)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(request_id_header(), MakeRequestUuidV4))
                    .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                        tracing::info_span!(
                            "request",
                            method = %request.method(),
                            uri = %request.uri(),
                            request_id = %request_id_of(request),
                        )
                    }))
                    .layer(PropagateRequestIdLayer::new(request_id_header()))
                    .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
                    .layer(cors)
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    ))),
            )
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.base_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// A handle to the fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}
