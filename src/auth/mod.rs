//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! Authorization: Bearer <jwt>
//!     → jwt.rs (HS256 verification, claims → Principal)
//!     → request extensions
//!     → principal.rs (CurrentUser extractor in handlers)
//! ```
//!
//! Verification never rejects a request on its own. Ownership decisions
//! belong to the review handlers.

pub mod jwt;
pub mod principal;

pub use jwt::{jwt_middleware, JwtVerifier, TokenError};
pub use principal::{CurrentUser, Principal};
