//! Bearer token verification.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use thiserror::Error;

use crate::auth::principal::Principal;
use crate::config::AuthConfig;
use crate::review::model::NumericId;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("missing Authorization header")]
    Missing,

    #[error("Authorization header is not a Bearer token")]
    NotBearer,

    #[error("invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
}

/// Claims issued by the identity service. `id` may be a number or a numeric
/// string depending on the issuer.
#[derive(Debug, Deserialize)]
struct Claims {
    id: NumericId,
    #[serde(default)]
    email: Option<String>,
}

/// HS256 verifier built once from config and shared by every request.
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.leeway_secs;
        Self {
            key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Decode a raw token into a principal.
    pub fn verify(&self, token: &str) -> Result<Principal, TokenError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        Ok(Principal {
            id: data.claims.id.get(),
            email: data.claims.email,
        })
    }

    /// Extract and verify the `Authorization: Bearer <token>` header.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Principal, TokenError> {
        let value = headers
            .get(AUTHORIZATION)
            .ok_or(TokenError::Missing)?
            .to_str()
            .map_err(|_| TokenError::NotBearer)?;
        let token = bearer_token(value).ok_or(TokenError::NotBearer)?;
        self.verify(token)
    }
}

fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Attach a [`Principal`] when the request carries a valid bearer token.
///
/// Requests without one pass through untouched; protected handlers reject
/// them with 403.
pub async fn jwt_middleware(
    State(verifier): State<Arc<JwtVerifier>>,
    mut req: Request,
    next: Next,
) -> Response {
    match verifier.authenticate(req.headers()) {
        Ok(principal) => {
            tracing::debug!(user_id = principal.id, "Authenticated request");
            req.extensions_mut().insert(principal);
        }
        Err(TokenError::Missing) => {}
        Err(e) => tracing::debug!(error = %e, "Ignoring unusable credentials"),
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;
    use std::time::{SystemTime, UNIX_EPOCH};

    const SECRET: &str = "unit-test-secret";

    fn verifier() -> JwtVerifier {
        JwtVerifier::new(&AuthConfig {
            jwt_secret: SECRET.into(),
            leeway_secs: 0,
        })
    }

    fn now() -> u64 {
        SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs()
    }

    fn token(claims: serde_json::Value, secret: &str) -> String {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn numeric_and_string_ids_are_accepted() {
        let v = verifier();
        let exp = now() + 600;

        let p = v
            .verify(&token(json!({"id": 7, "email": "a@b.c", "exp": exp}), SECRET))
            .unwrap();
        assert_eq!(p, Principal { id: 7, email: Some("a@b.c".into()) });

        let p = v.verify(&token(json!({"id": "7", "exp": exp}), SECRET)).unwrap();
        assert_eq!(p.id, 7);
        assert_eq!(p.email, None);
    }

    #[test]
    fn wrong_secret_expired_and_non_numeric_ids_fail() {
        let v = verifier();
        let exp = now() + 600;
        assert!(v.verify(&token(json!({"id": 1, "exp": exp}), "other")).is_err());
        assert!(v.verify(&token(json!({"id": 1, "exp": now() - 600}), SECRET)).is_err());
        assert!(v.verify(&token(json!({"id": "abc", "exp": exp}), SECRET)).is_err());
        assert!(v.verify(&token(json!({"id": 1}), SECRET)).is_err());
    }

    #[test]
    fn authorization_header_must_be_bearer() {
        let v = verifier();
        let mut headers = HeaderMap::new();
        assert!(matches!(v.authenticate(&headers), Err(TokenError::Missing)));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert!(matches!(v.authenticate(&headers), Err(TokenError::NotBearer)));

        let raw = token(json!({"id": 3, "exp": now() + 600}), SECRET);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("bearer {raw}")).unwrap(),
        );
        assert_eq!(v.authenticate(&headers).unwrap().id, 3);
    }
}
