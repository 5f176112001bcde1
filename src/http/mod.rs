//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request id assigned and propagated)
//!     → health.rs (/healthcheck) or review routes (/review/*)
//!     → Send to client
//! ```

pub mod health;
pub mod request;
pub mod server;

pub use request::{ForwardedRequestId, MakeRequestUuidV4, X_REQUEST_ID};
pub use server::{AppState, HttpServer, ServerError};
