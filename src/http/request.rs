//! Request IDs.
//!
//! Every inbound request gets an `x-request-id` (kept if the client sent
//! one, otherwise a fresh UUID v4). The id is echoed on the response, shown
//! in the trace span and forwarded on every upstream call.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderName, Request},
};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Header name for tower-http's request id layers.
pub fn request_id_header() -> HeaderName {
    HeaderName::from_static(X_REQUEST_ID)
}

/// Generates UUID v4 request ids.
#[derive(Clone, Copy, Debug, Default)]
pub struct MakeRequestUuidV4;

impl MakeRequestId for MakeRequestUuidV4 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let value = Uuid::new_v4().to_string().parse().ok()?;
        Some(RequestId::new(value))
    }
}

/// Read the request id of an http request, or `"unknown"`.
pub fn request_id_of<B>(request: &Request<B>) -> String {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// The current request id, for forwarding upstream.
#[derive(Debug, Clone)]
pub struct ForwardedRequestId(pub Option<String>);

impl<S> FromRequestParts<S> for ForwardedRequestId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(
            parts
                .headers
                .get(X_REQUEST_ID)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        ))
    }
}
