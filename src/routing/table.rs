//! The static route table.
//!
//! Every exposed endpoint is listed here exactly once, together with its
//! authorization rule and the action that shapes the upstream call.

use axum::http::Method;

use crate::dispatch::{AccessRule, Action};

/// Static binding of method + path to an authorization rule and an action.
#[derive(Debug)]
pub struct RouteDescriptor {
    /// Route identifier for logging/metrics.
    pub name: &'static str,
    pub method: Method,
    /// Path template with `{param}` segments.
    pub pattern: &'static str,
    pub rule: AccessRule,
    pub action: Action,
}

pub static ROUTES: &[RouteDescriptor] = &[
    RouteDescriptor {
        name: "health",
        method: Method::GET,
        pattern: "/health",
        rule: AccessRule::Public,
        action: Action::Health,
    },
    // Mehms
    RouteDescriptor {
        name: "mehms.list",
        method: Method::GET,
        pattern: "/api/mehms",
        rule: AccessRule::Authenticated,
        action: Action::ListMehms,
    },
    RouteDescriptor {
        name: "mehms.get",
        method: Method::GET,
        pattern: "/api/mehms/{id}",
        rule: AccessRule::Authenticated,
        action: Action::GetMehm,
    },
    RouteDescriptor {
        name: "mehms.like",
        method: Method::POST,
        pattern: "/api/mehms/{id}/like",
        rule: AccessRule::Authenticated,
        action: Action::LikeMehm,
    },
    RouteDescriptor {
        name: "mehms.remove",
        method: Method::POST,
        pattern: "/api/mehms/{id}/remove",
        rule: AccessRule::Authenticated,
        action: Action::RemoveMehm,
    },
    RouteDescriptor {
        name: "mehms.update",
        method: Method::POST,
        pattern: "/api/mehms/{id}/update",
        rule: AccessRule::AdminOnly,
        action: Action::UpdateMehm,
    },
    // Users
    RouteDescriptor {
        name: "user.profile",
        method: Method::GET,
        pattern: "/api/user",
        rule: AccessRule::Authenticated,
        action: Action::Profile,
    },
    RouteDescriptor {
        name: "user.all",
        method: Method::GET,
        pattern: "/api/user/all",
        rule: AccessRule::AdminOnly,
        action: Action::ListUsers,
    },
    RouteDescriptor {
        name: "user.elevate",
        method: Method::GET,
        pattern: "/api/user/elevate",
        rule: AccessRule::AdminOnly,
        action: Action::ToggleElevation,
    },
    RouteDescriptor {
        name: "user.delete",
        method: Method::POST,
        pattern: "/api/user/delete",
        rule: AccessRule::SelfOrAdmin,
        action: Action::DeleteUser,
    },
    // Comments
    RouteDescriptor {
        name: "comments.new",
        method: Method::POST,
        pattern: "/api/comments/new",
        rule: AccessRule::Authenticated,
        action: Action::NewComment,
    },
    RouteDescriptor {
        name: "comments.update",
        method: Method::POST,
        pattern: "/api/comments/update",
        rule: AccessRule::Authenticated,
        action: Action::UpdateComment,
    },
    RouteDescriptor {
        name: "comments.remove",
        method: Method::POST,
        pattern: "/api/comments/remove",
        rule: AccessRule::Authenticated,
        action: Action::RemoveComment,
    },
    RouteDescriptor {
        name: "comments.get",
        method: Method::GET,
        pattern: "/api/comments/{id}",
        rule: AccessRule::Authenticated,
        action: Action::GetComment,
    },
];
