//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → router.rs (route lookup)
//!     → matcher.rs (evaluate path pattern, capture params)
//!     → Return: RouteMatch, MethodNotAllowed or NotFound
//!
//! Route Compilation (at startup):
//!     table.rs ROUTES (static RouteDescriptor[])
//!     → Compile path patterns
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes are statically enumerated, never configured at runtime
//! - Every route carries exactly one authorization rule
//! - Deterministic: same input always matches same route
//! - First match wins (table order)

pub mod matcher;
pub mod router;
pub mod table;

pub use matcher::PathParams;
pub use router::{RouteLookup, RouteMatch, RouteTable};
pub use table::{RouteDescriptor, ROUTES};
