//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers and upstream client produce:
//!     → logging.rs (tracing subscriber, text or JSON)
//!     → metrics.rs (counters and histograms, Prometheus exporter)
//! ```

pub mod logging;
pub mod metrics;
