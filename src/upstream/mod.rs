//! Upstream forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! OutboundRequest (dispatch/outbound.rs)
//!     → forwarder.rs (one HTTP call, same method as inbound)
//!     → Response<Incoming> relayed by http/response.rs
//! ```
//!
//! # Design Decisions
//! - Exactly one attempt per inbound request; failures surface as 502
//! - No timeout beyond the connect timeout from configuration
//! - Response bodies are never buffered here

pub mod forwarder;

pub use forwarder::{ForwardError, Forwarder};
