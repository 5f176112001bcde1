//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! .env.<APP_ENV> / .env (dotenvy)
//! optional TOML file
//!     → loader.rs (parse, apply PORT / BREWERY_API_URL / JWT_SECRET overrides)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//! ```

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AuthConfig, ListenerConfig, LogFormat, ObservabilityConfig, ProxyConfig, SecurityConfig,
    TimeoutConfig, UpstreamConfig,
};
