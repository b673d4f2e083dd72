//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher, server lifecycle, registry:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (request counters and latency histograms)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - A missing route is a normal outcome, logged at debug
//! - Handler failures are logged at warn, never propagated
//! - Dispatch and failure log lines carry the request's `x-request-id`

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
