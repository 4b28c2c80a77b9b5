//! Route lookup.
//!
//! # Responsibilities
//! - Store compiled routes
//! - Look up matching route for method + path
//! - Return matched route, method mismatch, or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan over compiled patterns (the table is small and fixed)
//! - Explicit NotFound / MethodNotAllowed rather than silent default

use axum::http::Method;

use crate::routing::matcher::{PathParams, PathPattern};
use crate::routing::table::RouteDescriptor;

/// A route selected for a request, with its captured path parameters.
#[derive(Debug)]
pub struct RouteMatch {
    pub route: &'static RouteDescriptor,
    pub params: PathParams,
}

/// Outcome of a route lookup.
#[derive(Debug)]
pub enum RouteLookup {
    Matched(RouteMatch),
    /// The path exists but not for this method.
    MethodNotAllowed,
    NotFound,
}

/// Compiled, immutable route table.
#[derive(Debug)]
pub struct RouteTable {
    routes: Vec<(PathPattern, &'static RouteDescriptor)>,
}

impl RouteTable {
    /// Compile descriptors in order; earlier entries win on overlap.
    pub fn new(descriptors: &'static [RouteDescriptor]) -> Self {
        let routes = descriptors
            .iter()
            .map(|d| (PathPattern::compile(d.pattern), d))
            .collect();
        Self { routes }
    }

    pub fn lookup(&self, method: &Method, path: &str) -> RouteLookup {
        let mut path_known = false;

        for (pattern, route) in &self.routes {
            if let Some(params) = pattern.captures(path) {
                if route.method == *method {
                    return RouteLookup::Matched(RouteMatch { route, params });
                }
                path_known = true;
            }
        }

        if path_known {
            RouteLookup::MethodNotAllowed
        } else {
            RouteLookup::NotFound
        }
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
