//! Request dispatch pipeline.
//!
//! # Data Flow
//! ```text
//! matched route
//!     → authenticate (unless the route is public)
//!     → access.rs precheck (admin-only)
//!     → actions.rs prepare (extract + validate inputs)
//!     → access.rs authorize_target (self-or-admin)
//!     → outbound.rs build upstream URI
//!     → upstream::Forwarder (exactly one call)
//!     → http::response relay
//! ```
//!
//! Any failure short-circuits with a [`GatewayError`] and no upstream call.

pub mod access;
pub mod actions;
pub mod inputs;
pub mod outbound;

use std::time::Duration;

use axum::{body::Body, http::Request, response::Response};

use crate::auth::TokenAuthenticator;
use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::http::request::request_id;
use crate::http::response::relay;
use crate::observability::metrics;
use crate::routing::RouteMatch;
use crate::upstream::{ForwardError, Forwarder};

pub use access::AccessRule;
pub use actions::{Action, Inbound, Prepared};
pub use outbound::{OutboundRequest, Upstream, Upstreams};

/// Runs matched requests through the authentication and forwarding pipeline.
pub struct Dispatcher {
    authenticator: TokenAuthenticator,
    upstreams: Upstreams,
    forwarder: Forwarder,
    body_limit: usize,
}

impl Dispatcher {
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            authenticator: TokenAuthenticator::new(&config.auth),
            upstreams: Upstreams::new(&config.upstreams),
            forwarder: Forwarder::new(Duration::from_secs(config.timeouts.connect_secs)),
            body_limit: config.security.max_body_size,
        }
    }

    pub async fn dispatch(
        &self,
        matched: RouteMatch,
        request: Request<Body>,
    ) -> GatewayResult<Response> {
        let route = matched.route;
        let (parts, body) = request.into_parts();

        let identity = if route.rule.requires_identity() {
            let identity = self.authenticator.authenticate_headers(&parts.headers)?;
            route.rule.precheck(&identity)?;
            Some(identity)
        } else {
            None
        };

        let inbound = Inbound {
            method: parts.method,
            params: matched.params,
            query: parts.uri.query().map(str::to_owned),
            body,
            body_limit: self.body_limit,
        };

        let (outbound, owner) = match route.action.prepare(inbound, identity.as_ref()).await? {
            Prepared::Respond(response) => return Ok(response),
            Prepared::Forward { request, owner } => (request, owner),
        };

        if let Some(identity) = identity.as_ref() {
            route.rule.authorize_target(identity, owner.as_deref())?;
        }

        let uri = outbound.uri(&self.upstreams)?;
        tracing::debug!(
            route = route.name,
            upstream = outbound.upstream.as_str(),
            method = %outbound.method,
            uri = %uri,
            "Forwarding request"
        );

        let upstream = outbound.upstream;
        match self
            .forwarder
            .forward(outbound.method, uri, outbound.body, request_id(&parts.headers))
            .await
        {
            Ok(response) => Ok(relay(response)),
            Err(ForwardError::Connect(e)) => {
                tracing::error!(
                    route = route.name,
                    upstream = upstream.as_str(),
                    error = %e,
                    "Upstream error"
                );
                metrics::record_upstream_failure(upstream.as_str());
                Err(GatewayError::UpstreamUnreachable(upstream.as_str().to_string()))
            }
            Err(e @ ForwardError::Build(_)) => Err(GatewayError::Internal(e.to_string())),
        }
    }
}
