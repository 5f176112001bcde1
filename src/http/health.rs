//! Liveness endpoint.

use axum::{routing::any, Router};

pub const ALIVE: &str = "The Review Service is ALIVE!";

/// `/healthcheck`, any method. Never touches the upstream.
pub fn health_routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/healthcheck", any(liveness_check))
}

async fn liveness_check() -> &'static str {
    ALIVE
}
