//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! Authorization: Bearer <jwt>
//!     → token.rs (header format, signature, exp)
//!     → identity.rs (claims → Identity)
//!     → dispatcher (authorization rule, identity injection)
//! ```

pub mod identity;
pub mod token;

pub use identity::{Claims, Identity};
pub use token::{AuthError, TokenAuthenticator};
