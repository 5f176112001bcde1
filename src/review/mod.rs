//! Review proxy subsystem.
//!
//! # Data Flow
//! ```text
//! inbound /review/* request
//!     → payload.rs (JSON or form body → JSON object)
//!     → validation.rs (field rules, 400 on failure)
//!     → ownership.rs (principal vs. stored UserId, 403 on mismatch)
//!     → upstream.rs (reqwest call to the review/inventory API)
//!     → handlers.rs (echo upstream body or render error.rs)
//! ```

pub mod error;
pub mod handlers;
pub mod model;
pub mod ownership;
pub mod payload;
pub mod upstream;
pub mod validation;

use axum::{
    routing::{get, post},
    Router,
};

use crate::http::server::AppState;

pub use error::{Endpoint, ReviewError};
pub use upstream::{UpstreamClient, UpstreamError};

/// Routes under `/review`.
pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/review/add-review", post(handlers::add_review))
        .route("/review", get(handlers::list_reviews))
        .route("/review/", get(handlers::list_reviews))
        .route(
            "/review/product/{product_id}",
            get(handlers::list_product_reviews),
        )
        .route(
            "/review/{id}",
            get(handlers::get_review)
                .put(handlers::update_review)
                .delete(handlers::delete_review),
        )
}
