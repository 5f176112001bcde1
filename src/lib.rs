//! Review proxy library: a backend-for-frontend in front of the review and
//! inventory API.

pub mod auth;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod review;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
