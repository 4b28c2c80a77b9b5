//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, catch-all handler)
//!     → request.rs (request ID assigned or kept)
//!     → [routing table picks the route]
//!     → [dispatch pipeline authenticates, validates, forwards]
//!     → response.rs (relay status + body as JSON)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::HttpServer;
