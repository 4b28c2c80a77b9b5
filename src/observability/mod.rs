//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers and dispatch produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through logs and the upstream call
//! - Metrics are opt-in

pub mod logging;
pub mod metrics;
