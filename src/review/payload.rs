//! Body extractor for review routes.
//!
//! Accepts JSON or URL-encoded forms and hands the handler a plain JSON
//! object so the field rules see one shape regardless of encoding.

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
    Form,
};
use serde_json::{Map, Value};

use crate::review::error::ReviewError;
use crate::review::validation::FieldError;

/// Loosely typed request body.
#[derive(Debug, Default)]
pub struct ReviewPayload(pub Map<String, Value>);

fn is_form(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
}

impl<S> FromRequest<S> for ReviewPayload
where
    S: Send + Sync,
{
    type Rejection = ReviewError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(&req) {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| ReviewError::Body {
                    status: e.status(),
                    message: e.body_text(),
                })?;
            return Ok(Self(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Value::String(v)))
                    .collect(),
            ));
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ReviewError::Body {
                status: e.status(),
                message: e.body_text(),
            })?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(map)) => Ok(Self(map)),
            Ok(_) => Ok(Self::default()),
            Err(e) => Err(ReviewError::Validation(vec![FieldError::body(format!(
                "Malformed JSON body: {e}"
            ))])),
        }
    }
}
