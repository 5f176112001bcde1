//! The six review operations.
//!
//! Each one is a straight line: validate, authorize where the operation
//! mutates, forward, respond. Any early exit happens before the upstream is
//! touched for the mutating call.
//!
//! Lookup ids are forwarded as given and the upstream decides whether they
//! exist. Only the update needs a numeric id, since it is echoed in the
//! PUT body.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::auth::CurrentUser;
use crate::http::request::ForwardedRequestId;
use crate::http::server::AppState;
use crate::review::error::{Endpoint, ReviewError};
use crate::review::model::{CreateReviewRequest, ReviewOwner, UpdateReviewRequest};
use crate::review::ownership::authorize;
use crate::review::payload::ReviewPayload;
use crate::review::upstream::body_to_json;
use crate::review::validation;

type ReviewResult<T = Json<Value>> = Result<T, ReviewError>;

/// `POST /review/add-review`
pub async fn add_review(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    ForwardedRequestId(request_id): ForwardedRequestId,
    ReviewPayload(body): ReviewPayload,
) -> ReviewResult<(StatusCode, Json<Value>)> {
    let review = validation::new_review(&body).map_err(ReviewError::Validation)?;
    authorize(principal.as_ref(), Some(review.user_id))?;

    let upstream = &state.upstream;
    let rid = request_id.as_deref();

    upstream
        .product(&review.product_id.to_string(), rid)
        .await
        .map_err(ReviewError::upstream(Endpoint::AddReview))?;

    let created = upstream
        .create_review(&CreateReviewRequest::from(review), rid)
        .await
        .map_err(ReviewError::upstream(Endpoint::AddReview))?;

    Ok((StatusCode::CREATED, Json(body_to_json(&created))))
}

/// `GET /review/{id}`
pub async fn get_review(
    State(state): State<AppState>,
    ForwardedRequestId(request_id): ForwardedRequestId,
    Path(id): Path<String>,
) -> ReviewResult {
    let body = state
        .upstream
        .review(&id, request_id.as_deref())
        .await
        .map_err(ReviewError::upstream(Endpoint::GetReview))?;
    Ok(Json(body_to_json(&body)))
}

/// `PUT /review/{id}`
pub async fn update_review(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    ForwardedRequestId(request_id): ForwardedRequestId,
    Path(id): Path<String>,
    ReviewPayload(body): ReviewPayload,
) -> ReviewResult {
    let id = validation::review_id(&id).map_err(ReviewError::Validation)?;
    let patch = validation::review_patch(&body).map_err(ReviewError::Validation)?;

    let upstream = &state.upstream;
    let rid = request_id.as_deref();
    let segment = id.to_string();

    let current = upstream
        .review(&segment, rid)
        .await
        .map_err(ReviewError::upstream(Endpoint::UpdateReview))?;
    let owner = ReviewOwner::from_body(&current);
    let user_id = authorize(principal.as_ref(), owner.user_id.map(|id| id.get()))?;

    let update = UpdateReviewRequest::new(id, &owner, user_id, patch);
    let updated = upstream
        .update_review(&segment, &update, rid)
        .await
        .map_err(ReviewError::upstream(Endpoint::UpdateReview))?;
    Ok(Json(body_to_json(&updated)))
}

/// `DELETE /review/{id}`
pub async fn delete_review(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    ForwardedRequestId(request_id): ForwardedRequestId,
    Path(id): Path<String>,
) -> ReviewResult {
    let upstream = &state.upstream;
    let rid = request_id.as_deref();

    let current = upstream
        .review(&id, rid)
        .await
        .map_err(ReviewError::upstream(Endpoint::DeleteReview))?;
    let owner = ReviewOwner::from_body(&current);
    authorize(principal.as_ref(), owner.user_id.map(|id| id.get()))?;

    upstream
        .delete_review(&id, rid)
        .await
        .map_err(ReviewError::upstream(Endpoint::DeleteReview))?;

    tracing::info!(review_id = %id, "Review deleted");
    Ok(Json(json!({ "message": "Review deleted successfully" })))
}

/// `GET /review`
pub async fn list_reviews(
    State(state): State<AppState>,
    ForwardedRequestId(request_id): ForwardedRequestId,
) -> ReviewResult {
    let body = state
        .upstream
        .reviews(request_id.as_deref())
        .await
        .map_err(ReviewError::upstream(Endpoint::ListReviews))?;
    Ok(Json(body_to_json(&body)))
}

/// `GET /review/product/{productId}`
pub async fn list_product_reviews(
    State(state): State<AppState>,
    ForwardedRequestId(request_id): ForwardedRequestId,
    Path(product_id): Path<String>,
) -> ReviewResult {
    let body = state
        .upstream
        .product_reviews(&product_id, request_id.as_deref())
        .await
        .map_err(ReviewError::upstream(Endpoint::ListProductReviews))?;
    Ok(Json(body_to_json(&body)))
}
