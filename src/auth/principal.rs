//! The authenticated caller and its extractor.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

/// Identity attached to a request by [`jwt_middleware`](super::jwt::jwt_middleware).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: i64,
    pub email: Option<String>,
}

/// Optional principal for the current request.
///
/// Never rejects: a request without a verified token yields `CurrentUser(None)`
/// and it is up to the handler to refuse protected operations.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<Principal>);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<Principal>().cloned()))
    }
}
