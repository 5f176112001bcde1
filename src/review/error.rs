//! Review handler errors and their HTTP rendering.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::review::upstream::UpstreamError;
use crate::review::validation::FieldError;

/// The six proxied operations. Each owns its fallbacks for upstream
/// failures that carry no status or message of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    AddReview,
    GetReview,
    UpdateReview,
    DeleteReview,
    ListReviews,
    ListProductReviews,
}

impl Endpoint {
    pub fn fallback_status(self) -> StatusCode {
        match self {
            Self::AddReview | Self::ListReviews | Self::ListProductReviews => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::GetReview | Self::UpdateReview | Self::DeleteReview => StatusCode::NOT_FOUND,
        }
    }

    pub fn fallback_message(self) -> &'static str {
        match self {
            Self::AddReview => "Error adding review",
            Self::GetReview | Self::UpdateReview | Self::DeleteReview => "Review not found",
            Self::ListReviews | Self::ListProductReviews => "Error fetching reviews",
        }
    }

    /// Label used in the diagnostic log line.
    pub fn log_label(self) -> &'static str {
        match self {
            Self::AddReview => "Error adding review",
            Self::GetReview => "Error fetching review",
            Self::UpdateReview => "Error updating review",
            Self::DeleteReview => "Error deleting review",
            Self::ListReviews => "Error fetching reviews",
            Self::ListProductReviews => "Error fetching product reviews",
        }
    }
}

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("request failed validation ({} field errors)", .0.len())]
    Validation(Vec<FieldError>),

    #[error("caller does not own the review")]
    Unauthorized,

    #[error("request body rejected: {message}")]
    Body { status: StatusCode, message: String },

    #[error("{}: {source}", .endpoint.log_label())]
    Upstream {
        endpoint: Endpoint,
        #[source]
        source: UpstreamError,
    },
}

impl ReviewError {
    pub fn upstream(endpoint: Endpoint) -> impl FnOnce(UpstreamError) -> Self {
        move |source| Self::Upstream { endpoint, source }
    }
}

/// `{message, error?}` body for upstream failures.
#[derive(Debug, Serialize)]
struct UpstreamFailure {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<Value>,
}

impl IntoResponse for ReviewError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(errors) => {
                tracing::debug!(count = errors.len(), "Rejecting invalid review request");
                (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))).into_response()
            }
            Self::Unauthorized => {
                tracing::warn!("Rejecting review operation by non-owner");
                (StatusCode::FORBIDDEN, Json(json!({ "message": "Unauthorized" }))).into_response()
            }
            Self::Body { status, message } => {
                tracing::debug!(status = %status, message = %message, "Rejecting request body");
                (status, Json(json!({ "message": message }))).into_response()
            }
            Self::Upstream { endpoint, source } => {
                let status = source.status().unwrap_or_else(|| endpoint.fallback_status());
                tracing::error!(
                    status = %status,
                    upstream_status = ?source.status(),
                    error = %source,
                    detail = ?source.detail(),
                    "{}",
                    endpoint.log_label()
                );
                let body = UpstreamFailure {
                    message: source
                        .message()
                        .unwrap_or_else(|| endpoint.fallback_message())
                        .to_string(),
                    error: source.detail(),
                };
                (status, Json(body)).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::upstream::UpstreamErrorBody;
    use axum::body::to_bytes;

    async fn render(err: ReviewError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn status_error(status: StatusCode, body: Option<UpstreamErrorBody>) -> UpstreamError {
        UpstreamError::Status { status, body }
    }

    #[tokio::test]
    async fn upstream_status_and_message_pass_through() {
        let err = ReviewError::upstream(Endpoint::AddReview)(status_error(
            StatusCode::NOT_FOUND,
            Some(UpstreamErrorBody {
                message: Some("Product not found".into()),
                errors: None,
            }),
        ));
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"message": "Product not found"}));
    }

    #[tokio::test]
    async fn upstream_field_errors_are_forwarded() {
        let err = ReviewError::upstream(Endpoint::UpdateReview)(status_error(
            StatusCode::BAD_REQUEST,
            Some(UpstreamErrorBody {
                message: None,
                errors: Some(json!({"ReviewRating": ["out of range"]})),
            }),
        ));
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"message": "Review not found", "error": {"ReviewRating": ["out of range"]}})
        );
    }

    #[tokio::test]
    async fn unstructured_upstream_body_uses_fallback_message() {
        let err = ReviewError::upstream(Endpoint::ListReviews)(status_error(
            StatusCode::BAD_GATEWAY,
            None,
        ));
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body, json!({"message": "Error fetching reviews"}));
    }

    #[test]
    fn fallbacks_follow_the_endpoint_kind() {
        assert_eq!(Endpoint::AddReview.fallback_status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(Endpoint::ListProductReviews.fallback_status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(Endpoint::GetReview.fallback_status(), StatusCode::NOT_FOUND);
        assert_eq!(Endpoint::DeleteReview.fallback_status(), StatusCode::NOT_FOUND);
        assert_eq!(Endpoint::ListProductReviews.log_label(), "Error fetching product reviews");
    }

    #[tokio::test]
    async fn unauthorized_and_validation_shapes() {
        let (status, body) = render(ReviewError::Unauthorized).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, json!({"message": "Unauthorized"}));

        let (status, body) =
            render(ReviewError::Validation(vec![FieldError::body("Malformed JSON body")])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"errors": [{"type": "body", "msg": "Malformed JSON body", "location": "body"}]})
        );
    }
}
