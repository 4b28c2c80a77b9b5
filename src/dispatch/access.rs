//! Authorization rules.

use crate::auth::Identity;
use crate::error::{GatewayError, GatewayResult};

/// The single authorization rule attached to each route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessRule {
    /// No credential required.
    Public,
    /// Any verified identity passes.
    Authenticated,
    /// Admins, or the caller acting on its own account.
    SelfOrAdmin,
    /// Admins only.
    AdminOnly,
}

impl AccessRule {
    pub fn requires_identity(self) -> bool {
        !matches!(self, AccessRule::Public)
    }

    /// Checks that only need the identity. Runs before any input is parsed.
    pub fn precheck(self, identity: &Identity) -> GatewayResult<()> {
        match self {
            AccessRule::AdminOnly if !identity.is_admin => Err(GatewayError::Forbidden("admin-only")),
            _ => Ok(()),
        }
    }

    /// Checks that need the owner of the targeted resource.
    pub fn authorize_target(self, identity: &Identity, owner: Option<&str>) -> GatewayResult<()> {
        match self {
            AccessRule::SelfOrAdmin if identity.is_admin => Ok(()),
            AccessRule::SelfOrAdmin => match owner {
                Some(owner) if owner == identity.id => Ok(()),
                _ => Err(GatewayError::Forbidden("not authorized")),
            },
            _ => Ok(()),
        }
    }
}
