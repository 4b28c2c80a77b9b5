//! Authenticated API gateway for the mehm platform.
//!
//! Verifies bearer tokens locally, enforces per-route authorization,
//! validates inputs and forwards each accepted request to the user
//! service or the mehm content service.

// Core subsystems
pub mod config;
pub mod http;
pub mod routing;
pub mod upstream;

// Request pipeline
pub mod auth;
pub mod dispatch;
pub mod error;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::GatewayConfig;
pub use error::{ErrorEnvelope, GatewayError, GatewayResult};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
