//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (environment overrides: PORT, USERS_HOST, MEHMS_HOST, SECRET_KEY)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → handed to HttpServer::new at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; nothing reads the environment afterwards
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Any validation failure is fatal at startup

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AuthConfig, CorsConfig, GatewayConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    SecurityConfig, TimeoutConfig, UpstreamConfig,
};
