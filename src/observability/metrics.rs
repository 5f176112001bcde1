//! Metrics collection and exposition.
//!
//! # Metrics
//! - `review_proxy_requests_total` (counter): inbound requests by method, route, status
//! - `review_proxy_request_duration_seconds` (histogram): inbound latency
//! - `review_proxy_upstream_requests_total` (counter): upstream calls by method, route, outcome
//! - `review_proxy_upstream_duration_seconds` (histogram): upstream latency
//!
//! Without an installed recorder every call here is a no-op, so handlers and
//! tests never need to care whether the exporter is running.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one inbound request.
pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];
    metrics::counter!("review_proxy_requests_total", &labels).increment(1);
    metrics::histogram!("review_proxy_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

/// Record one upstream call. `outcome` is the status code or `"error"`.
pub fn record_upstream(method: &str, route: &'static str, outcome: String, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("route", route.to_string()),
        ("outcome", outcome),
    ];
    metrics::counter!("review_proxy_upstream_requests_total", &labels).increment(1);
    metrics::histogram!("review_proxy_upstream_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

/// Route-level middleware feeding [`record_request`]. Must be installed
/// with `route_layer` so the matched route template is known.
pub async fn track_requests(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    record_request(&method, &route, response.status().as_u16(), start);
    response
}
