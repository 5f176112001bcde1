//! Client for the upstream review/inventory API.
//!
//! One method per upstream route. Success yields the raw body; any non-2xx
//! answer or transport failure becomes an [`UpstreamError`] that keeps
//! whatever structure the upstream provided.

use std::time::{Duration, Instant};

use axum::body::Bytes;
use axum::http::{Method, StatusCode};
use reqwest::RequestBuilder;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::config::UpstreamConfig;
use crate::http::request::X_REQUEST_ID;
use crate::observability::metrics;
use crate::review::model::{CreateReviewRequest, UpdateReviewRequest};

/// Structured part of an upstream error body, when there is one.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UpstreamErrorBody {
    #[serde(default, deserialize_with = "string_or_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Option<Value>,
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

impl UpstreamErrorBody {
    fn parse(body: &[u8]) -> Option<Self> {
        serde_json::from_slice(body).ok()
    }
}

#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The upstream answered with a non-success status.
    #[error("upstream responded with {status}")]
    Status {
        status: StatusCode,
        body: Option<UpstreamErrorBody>,
    },

    /// No response was received at all.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// A path segment that no upstream resource can be addressed by.
    #[error("{0:?} is not a valid resource id")]
    InvalidPath(String),
}

impl UpstreamError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::InvalidPath(_) => Some(StatusCode::NOT_FOUND),
            Self::Transport(_) => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Status { body: Some(body), .. } => body.message.as_deref(),
            _ => None,
        }
    }

    /// Upstream field errors if it sent any, else the raw failure text when
    /// there was no response to take them from.
    pub fn detail(&self) -> Option<Value> {
        match self {
            Self::Status { body, .. } => body.as_ref().and_then(|b| b.errors.clone()),
            Self::Transport(e) => Some(Value::String(e.to_string())),
            Self::InvalidPath(_) => None,
        }
    }
}

/// Failure to build an [`UpstreamClient`] from config.
#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid upstream base URL: {0}")]
    BaseUrl(#[from] url::ParseError),

    #[error("upstream base URL cannot carry a path: {0}")]
    NotABase(String),
}

/// Thin typed wrapper around a shared `reqwest::Client`.
#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: Url,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, ClientBuildError> {
        let base_url = Url::parse(&config.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ClientBuildError::NotABase(config.base_url.clone()));
        }

        let mut builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs));
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            http: builder.build()?,
            base_url,
        })
    }

    /// Append `segments` to the base URL. Each segment is percent-encoded,
    /// so a caller-supplied id can never add path levels or a query. Dot
    /// segments are refused since `url` would drop them.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, UpstreamError> {
        if let Some(dot) = segments.iter().find(|s| matches!(**s, "." | "..")) {
            return Err(UpstreamError::InvalidPath(dot.to_string()));
        }
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    fn request(
        &self,
        method: Method,
        segments: &[&str],
        request_id: Option<&str>,
    ) -> Result<RequestBuilder, UpstreamError> {
        let builder = self.http.request(method, self.endpoint(segments)?);
        Ok(match request_id {
            Some(id) => builder.header(X_REQUEST_ID, id),
            None => builder,
        })
    }

    async fn dispatch(
        &self,
        method: &Method,
        route: &'static str,
        builder: RequestBuilder,
    ) -> Result<Bytes, UpstreamError> {
        let start = Instant::now();
        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                metrics::record_upstream(method.as_str(), route, "error".into(), start);
                return Err(e.into());
            }
        };

        let status = response.status();
        let body = response.bytes().await;
        metrics::record_upstream(method.as_str(), route, status.as_u16().to_string(), start);
        tracing::debug!(method = %method, route, status = %status, "Upstream call finished");

        match body {
            Ok(body) if status.is_success() => Ok(body),
            Ok(body) => Err(UpstreamError::Status {
                status,
                body: UpstreamErrorBody::parse(&body),
            }),
            Err(e) if status.is_success() => Err(e.into()),
            Err(e) => {
                tracing::debug!(status = %status, error = %e, "Upstream error body unreadable");
                Err(UpstreamError::Status { status, body: None })
            }
        }
    }

    async fn get(
        &self,
        route: &'static str,
        segments: &[&str],
        request_id: Option<&str>,
    ) -> Result<Bytes, UpstreamError> {
        let builder = self.request(Method::GET, segments, request_id)?;
        self.dispatch(&Method::GET, route, builder).await
    }

    async fn send_json<B: Serialize>(
        &self,
        method: Method,
        route: &'static str,
        segments: &[&str],
        body: &B,
        request_id: Option<&str>,
    ) -> Result<Bytes, UpstreamError> {
        let builder = self.request(method.clone(), segments, request_id)?.json(body);
        self.dispatch(&method, route, builder).await
    }

    /// `GET /api/inventory/{productId}`; success means the product exists.
    pub async fn product(&self, product_id: &str, request_id: Option<&str>) -> Result<Bytes, UpstreamError> {
        self.get("/api/inventory/{id}", &["api", "inventory", product_id], request_id)
            .await
    }

    /// `POST /api/reviews`
    pub async fn create_review(
        &self,
        review: &CreateReviewRequest,
        request_id: Option<&str>,
    ) -> Result<Bytes, UpstreamError> {
        self.send_json(Method::POST, "/api/reviews", &["api", "reviews"], review, request_id)
            .await
    }

    /// `GET /api/reviews/{id}`
    pub async fn review(&self, id: &str, request_id: Option<&str>) -> Result<Bytes, UpstreamError> {
        self.get("/api/reviews/{id}", &["api", "reviews", id], request_id)
            .await
    }

    /// `PUT /api/reviews/{id}`
    pub async fn update_review(
        &self,
        id: &str,
        update: &UpdateReviewRequest,
        request_id: Option<&str>,
    ) -> Result<Bytes, UpstreamError> {
        self.send_json(
            Method::PUT,
            "/api/reviews/{id}",
            &["api", "reviews", id],
            update,
            request_id,
        )
        .await
    }

    /// `DELETE /api/reviews/{id}`
    pub async fn delete_review(&self, id: &str, request_id: Option<&str>) -> Result<Bytes, UpstreamError> {
        let builder = self.request(Method::DELETE, &["api", "reviews", id], request_id)?;
        self.dispatch(&Method::DELETE, "/api/reviews/{id}", builder).await
    }

    /// `GET /api/reviews`
    pub async fn reviews(&self, request_id: Option<&str>) -> Result<Bytes, UpstreamError> {
        self.get("/api/reviews", &["api", "reviews"], request_id)
            .await
    }

    /// `GET /api/reviews/product/{productId}`
    pub async fn product_reviews(
        &self,
        product_id: &str,
        request_id: Option<&str>,
    ) -> Result<Bytes, UpstreamError> {
        self.get(
            "/api/reviews/product/{id}",
            &["api", "reviews", "product", product_id],
            request_id,
        )
        .await
    }
}

/// Echo an upstream success body. JSON passes through as-is; anything else
/// (including an empty body) is returned as a JSON string.
pub fn body_to_json(body: &[u8]) -> Value {
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}
