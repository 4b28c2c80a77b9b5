//! Verified caller identity.

use serde::{Deserialize, Serialize};

/// Caller attributes taken from a verified bearer token.
///
/// Built once per request and never stored by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: String,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
}

impl Identity {
    /// `isAdmin` as sent to upstream services.
    pub fn admin_flag(&self) -> &'static str {
        if self.is_admin {
            "true"
        } else {
            "false"
        }
    }
}

/// Private claims issued by the identity service.
///
/// Registered claims (`exp`, `nbf`) are checked by `jsonwebtoken` during
/// decoding and are not kept here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub admin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.id,
            username: claims.username,
            email: claims.email,
            is_admin: claims.admin,
        }
    }
}
